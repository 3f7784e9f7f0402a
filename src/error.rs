use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 后端 API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 稿件文档处理错误（DOCX 解析、PDF 生成）
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 后端拒绝请求（4xx，带有服务端给出的 error 文本）
    #[error("API拒绝请求 ({endpoint}): status={status}, message={message}")]
    Rejected {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// API 返回非预期的状态码
    #[error("API返回错误响应 ({endpoint}): status={status}, body={body:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        body: Option<String>,
    },
    /// 响应体缺少必需字段
    #[error("API响应缺少字段 ({endpoint}): {field}")]
    MissingField { endpoint: String, field: String },
    /// JSON 解析失败
    #[error("JSON解析失败: {source}")]
    JsonParseFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApiError {
    /// 服务端返回的提示文本（如果有）
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 不支持的文件类型
    #[error("不支持的文件类型: {file_name} (需要 {expected})")]
    UnsupportedType { file_name: String, expected: String },
}

/// 稿件文档处理错误
#[derive(Debug, Error)]
pub enum DocumentError {
    /// DOCX 容器（zip）无法读写
    #[error("DOCX容器错误: {0}")]
    Container(#[from] zip::result::ZipError),
    /// 容器中缺少 word/document.xml
    #[error("DOCX中缺少 {0}")]
    MissingPart(String),
    /// XML 解析或序列化失败
    #[error("XML处理失败: {0}")]
    Xml(String),
    /// PDF 生成失败
    #[error("PDF生成失败: {0}")]
    Pdf(String),
    /// 没有可排版的正文
    #[error("稿件中没有可用的正文内容")]
    EmptyBody,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量取值无效
    #[error("环境变量 {var_name} 的值 '{value}' 无效，期望 {expected}")]
    InvalidValue {
        var_name: String,
        value: String,
        expected: String,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::Document(DocumentError::Container(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return AppError::File(FileError::NotFound { path: path.into() });
        }
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建 XML 处理错误
    pub fn xml(err: impl std::fmt::Display) -> Self {
        AppError::Document(DocumentError::Xml(err.to_string()))
    }

    /// 创建 PDF 生成错误
    pub fn pdf(err: impl std::fmt::Display) -> Self {
        AppError::Document(DocumentError::Pdf(err.to_string()))
    }

    /// 面向用户的简短提示：优先使用服务端返回的 error 文本
    pub fn user_message(&self) -> Option<&str> {
        match self {
            AppError::Api(api) => api.server_message(),
            _ => None,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_exposes_server_message() {
        let err = AppError::Api(ApiError::Rejected {
            endpoint: "/submissions/verify-code".to_string(),
            status: 400,
            message: "Invalid verification code".to_string(),
        });
        assert_eq!(err.user_message(), Some("Invalid verification code"));
    }

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AppError::file_read_failed("paper.docx", io);
        assert!(matches!(err, AppError::File(FileError::NotFound { .. })));
        assert!(err.user_message().is_none());
    }
}
