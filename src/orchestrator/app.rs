//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、启动信息、后端客户端
//! 2. **命令分发**：提交草稿、生成审稿版、写入行号、远程预览、提取元数据
//! 3. **文件读写**：只有本层接触文件系统，下层只处理内存中的字节

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::info;

use crate::clients::{SubmissionApi, SubmissionClient};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{load_draft_file, load_uploaded_file, JournalCatalog, Metadata};
use crate::orchestrator::draft_runner::{self, CodePrompt, DraftOutcome};
use crate::services::review_copy::docx;
use crate::services::{
    extractor_for, LocalPaginator, RemoteConverter, ReviewCopy, ReviewCopyGenerator,
};
use crate::utils::logging::{init_log_file, log_startup};
use crate::workflow::Wizard;

/// 应用主结构
pub struct App {
    config: Config,
    api: Arc<dyn SubmissionApi>,
}

impl App {
    /// 初始化应用（连接真实后端）
    pub fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(&config.api_base_url);

        let client = SubmissionClient::new(&config)?;
        Ok(Self::with_api(config, Arc::new(client)))
    }

    /// 使用给定的后端实现
    pub fn with_api(config: Config, api: Arc<dyn SubmissionApi>) -> Self {
        Self { config, api }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn new_wizard(&self) -> Wizard {
        Wizard::new(
            self.api.clone(),
            extractor_for(&self.config, self.api.clone()),
            JournalCatalog::default(),
        )
    }

    /// 提交一份 TOML 草稿
    pub async fn submit_draft(
        &self,
        draft_path: &Path,
        prompt: &mut dyn CodePrompt,
    ) -> Result<DraftOutcome> {
        let loaded = load_draft_file(draft_path).await?;
        let mut wizard = self.new_wizard();
        draft_runner::process_draft(
            &mut wizard,
            &loaded,
            prompt,
            self.config.generate_preview,
        )
        .await
    }

    /// 本地生成带行号的审稿版 PDF，返回输出路径
    pub async fn review_copy(&self, input: &Path, output: Option<PathBuf>) -> Result<PathBuf> {
        let manuscript = load_uploaded_file(input).await?;
        let generator: Box<dyn ReviewCopyGenerator> = Box::new(LocalPaginator::default());

        match generator.generate(&manuscript).await? {
            ReviewCopy::Document { file_name, bytes } => {
                let output =
                    output.unwrap_or_else(|| Path::new(&self.config.output_dir).join(file_name));
                write_output(&output, &bytes).await?;
                info!("✓ 审稿版已保存: {}", output.display());
                Ok(output)
            }
            ReviewCopy::Hosted { url } => {
                anyhow::bail!("本地生成不应返回远程地址: {}", url)
            }
        }
    }

    /// 远程预览：写入行号后上传转换，返回 PDF 地址
    pub async fn preview(&self, input: &Path) -> Result<String> {
        let manuscript = load_uploaded_file(input).await?;
        let generator: Box<dyn ReviewCopyGenerator> =
            Box::new(RemoteConverter::new(self.api.clone()));

        match generator.generate(&manuscript).await? {
            ReviewCopy::Hosted { url } => Ok(url),
            ReviewCopy::Document { .. } => {
                anyhow::bail!("远程转换没有返回 PDF 地址")
            }
        }
    }

    /// 按配置的方式提取元数据
    pub async fn extract_metadata(&self, input: &Path) -> Result<Metadata> {
        let manuscript = load_uploaded_file(input).await?;
        let extractor = extractor_for(&self.config, self.api.clone());
        let metadata = extractor.extract(&manuscript).await?;
        Ok(metadata)
    }
}

/// 只在本地写入行号，不访问网络
pub async fn number_lines_file(input: &Path, output: &Path) -> Result<()> {
    let bytes = fs::read(input)
        .await
        .map_err(|e| AppError::file_read_failed(input.display().to_string(), e))?;
    let numbered = docx::number_lines(&bytes)?;
    write_output(output, &numbered).await?;
    info!(
        "✓ 已写入行号: {} -> {}",
        input.display(),
        output.display()
    );
    Ok(())
}

async fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
    }
    fs::write(path, bytes)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    Ok(())
}
