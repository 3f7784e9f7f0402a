use std::str::FromStr;

use crate::error::ConfigError;

/// 元数据提取方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionMode {
    /// 调用后端 extract-metadata 接口
    Remote,
    /// 本地从 DOCX 段落中推断
    Local,
}

impl FromStr for ExtractionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(ExtractionMode::Remote),
            "local" => Ok(ExtractionMode::Local),
            other => Err(ConfigError::InvalidValue {
                var_name: "METADATA_EXTRACTION".to_string(),
                value: other.to_string(),
                expected: "remote | local".to_string(),
            }),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 后端 API 基础地址（所有 /submissions/* 路径都拼接在它后面）
    pub api_base_url: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 审稿版 PDF 等产物的输出目录
    pub output_dir: String,
    /// 元数据提取方式
    pub metadata_extraction: ExtractionMode,
    /// 提交前是否生成远程 PDF 预览
    pub generate_preview: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            request_timeout_secs: 60,
            output_dir: "output".to_string(),
            metadata_extraction: ExtractionMode::Remote,
            generate_preview: false,
            verbose_logging: false,
            output_log_file: "submission.log".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("MANUSCRIPT_API_BASE_URL").unwrap_or(default.api_base_url),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            metadata_extraction: std::env::var("METADATA_EXTRACTION").ok().and_then(|v| v.parse().ok()).unwrap_or(default.metadata_extraction),
            generate_preview: std::env::var("GENERATE_PREVIEW").ok().and_then(|v| v.parse().ok()).unwrap_or(default.generate_preview),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// 拼接完整的接口地址
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
