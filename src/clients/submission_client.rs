//! 投稿后端 API 客户端
//!
//! 封装所有与投稿后端 `/submissions/*` 接口相关的调用逻辑

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::draft::{AuthorInfo, CoAuthor, Metadata, SubmissionDraft, UploadedFile};

/// 接口路径（相对于 API 基础地址）
pub mod paths {
    pub const SEND_VERIFICATION: &str = "submissions/send-verification";
    pub const VERIFY_CODE: &str = "submissions/verify-code";
    pub const EXTRACT_METADATA: &str = "submissions/extract-metadata";
    pub const CONVERT_TO_PDF: &str = "submissions/convert-to-pdf";
    pub const SUBMIT: &str = "submissions/submit";
}

/// multipart 中的文件字段名
pub mod fields {
    pub const MANUSCRIPT_FILE: &str = "manuscriptFile";
    pub const SUPPORTING_FILES: &str = "supportingFiles";
    /// convert-to-pdf 接口的文件字段
    pub const CONVERT_FILE: &str = "file";
}

/// 一般接口：任意 2xx 视为成功
pub fn is_call_success(status: StatusCode) -> bool {
    status.is_success()
}

/// 提交接口：只有 201 视为成功
pub fn is_submit_success(status: StatusCode) -> bool {
    status == StatusCode::CREATED
}

/// 向导依赖的后端能力
///
/// 生产环境使用 [`SubmissionClient`]，测试中可以替换为内存实现
#[async_trait]
pub trait SubmissionApi: Send + Sync {
    /// 给邮箱发送验证码（重复发送会使旧验证码失效）
    async fn send_verification(&self, email: &str) -> AppResult<()>;

    /// 校验验证码，错误的验证码返回 `ApiError::Rejected`
    async fn verify_code(&self, email: &str, code: &str) -> AppResult<()>;

    /// 从稿件中提取元数据
    async fn extract_metadata(&self, manuscript: &UploadedFile) -> AppResult<Metadata>;

    /// 上传（已加行号的）DOCX，返回托管 PDF 的地址
    async fn convert_to_pdf(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<String>;

    /// 提交稿件，只有 201 视为成功
    async fn submit(&self, payload: &SubmissionPayload) -> AppResult<()>;
}

/// 提交接口的完整负载
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub journal_selection: String,
    pub requirements: Vec<String>,
    pub author_info: AuthorInfo,
    pub co_authors: Vec<CoAuthor>,
    pub metadata: Metadata,
    pub cover_letter: String,
    pub manuscript_file: UploadedFile,
    pub supporting_files: Vec<UploadedFile>,
    pub confirmed: bool,
}

impl SubmissionPayload {
    /// 打包草稿；没有稿件文件时返回 None
    pub fn from_draft(draft: &SubmissionDraft) -> Option<Self> {
        let manuscript_file = draft.manuscript.clone()?;
        Some(Self {
            journal_selection: draft.journal.clone(),
            requirements: draft.requirements.clone(),
            author_info: draft.author.clone(),
            co_authors: draft.co_authors.clone(),
            metadata: draft.metadata.clone(),
            cover_letter: draft.cover_letter.clone(),
            manuscript_file,
            supporting_files: draft.supporting_files.clone(),
            confirmed: draft.confirmed,
        })
    }

    /// multipart 中的文本字段（按发送顺序），JSON 字段已序列化
    pub fn text_fields(&self) -> AppResult<Vec<(&'static str, String)>> {
        let mut fields = vec![
            ("journalSelection", self.journal_selection.clone()),
            ("authorInfo", serde_json::to_string(&self.author_info)?),
            ("coAuthors", serde_json::to_string(&self.co_authors)?),
            ("metadata", serde_json::to_string(&self.metadata)?),
            ("coverLetter", self.cover_letter.clone()),
        ];
        for requirement in &self.requirements {
            fields.push(("requirements", requirement.clone()));
        }
        fields.push(("confirmed", self.confirmed.to_string()));
        Ok(fields)
    }

    /// 构建 multipart 表单
    fn to_form(&self) -> AppResult<Form> {
        let mut form = Form::new();
        for (name, value) in self.text_fields()? {
            form = form.text(name, value);
        }
        form = form.part(fields::MANUSCRIPT_FILE, file_part(&self.manuscript_file)?);
        for file in &self.supporting_files {
            form = form.part(fields::SUPPORTING_FILES, file_part(file)?);
        }
        Ok(form)
    }
}

fn file_part(file: &UploadedFile) -> AppResult<Part> {
    Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)
        .map_err(|e| AppError::api_request_failed(paths::SUBMIT, e))
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(rename = "pdfUrl")]
    pdf_url: Option<String>,
}

/// 把失败的响应归类为 API 错误
///
/// 4xx 且响应体带有 `error`（或 `message`）字段时视为后端明确拒绝
pub fn classify_failure(endpoint: &str, status: u16, body: Option<String>) -> ApiError {
    let server_message = body
        .as_deref()
        .and_then(|text| serde_json::from_str::<Value>(text).ok())
        .and_then(|value| {
            value
                .get("error")
                .or_else(|| value.get("message"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        });

    match server_message {
        Some(message) if (400..500).contains(&status) => ApiError::Rejected {
            endpoint: endpoint.to_string(),
            status,
            message,
        },
        _ => ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            status,
            body,
        },
    }
}

/// 投稿后端 HTTP 客户端
pub struct SubmissionClient {
    http: reqwest::Client,
    config: Config,
}

impl SubmissionClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed(config.api_base_url.clone(), e))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    async fn post_json(&self, path: &str, body: Value) -> AppResult<reqwest::Response> {
        let url = self.config.endpoint(path);
        debug!("POST {} (json)", url);
        self.http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))
    }

    async fn post_form(&self, path: &str, form: Form) -> AppResult<reqwest::Response> {
        let url = self.config.endpoint(path);
        debug!("POST {} (multipart)", url);
        self.http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))
    }

    /// 检查状态码，失败时读取响应体并归类
    async fn ensure(
        path: &str,
        response: reqwest::Response,
        accept: fn(StatusCode) -> bool,
    ) -> AppResult<reqwest::Response> {
        let status = response.status();
        if accept(status) {
            return Ok(response);
        }
        let body = response.text().await.ok().filter(|b| !b.is_empty());
        let err = classify_failure(path, status.as_u16(), body);
        warn!("接口调用失败: {}", err);
        Err(err.into())
    }

    async fn read_body(path: &str, response: reqwest::Response) -> AppResult<String> {
        response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))
    }
}

#[async_trait]
impl SubmissionApi for SubmissionClient {
    async fn send_verification(&self, email: &str) -> AppResult<()> {
        let response = self
            .post_json(paths::SEND_VERIFICATION, json!({ "email": email }))
            .await?;
        Self::ensure(paths::SEND_VERIFICATION, response, is_call_success).await?;
        info!("✓ 验证码已发送至 {}", email);
        Ok(())
    }

    async fn verify_code(&self, email: &str, code: &str) -> AppResult<()> {
        let response = self
            .post_json(paths::VERIFY_CODE, json!({ "email": email, "code": code }))
            .await?;
        Self::ensure(paths::VERIFY_CODE, response, is_call_success).await?;
        Ok(())
    }

    async fn extract_metadata(&self, manuscript: &UploadedFile) -> AppResult<Metadata> {
        let form = Form::new().part(fields::MANUSCRIPT_FILE, file_part(manuscript)?);
        let response = self.post_form(paths::EXTRACT_METADATA, form).await?;
        let response = Self::ensure(paths::EXTRACT_METADATA, response, is_call_success).await?;
        let body = Self::read_body(paths::EXTRACT_METADATA, response).await?;
        let metadata: Metadata = serde_json::from_str(&body)?;
        debug!("提取到的元数据: {:?}", metadata);
        Ok(metadata)
    }

    async fn convert_to_pdf(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<String> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(crate::models::file_kind::DOCX_MIME)
            .map_err(|e| AppError::api_request_failed(paths::CONVERT_TO_PDF, e))?;
        let form = Form::new().part(fields::CONVERT_FILE, part);

        let response = self.post_form(paths::CONVERT_TO_PDF, form).await?;
        let response = Self::ensure(paths::CONVERT_TO_PDF, response, is_call_success).await?;
        let body = Self::read_body(paths::CONVERT_TO_PDF, response).await?;

        parse_pdf_url(&body)
    }

    async fn submit(&self, payload: &SubmissionPayload) -> AppResult<()> {
        let form = payload.to_form()?;
        let response = self.post_form(paths::SUBMIT, form).await?;
        Self::ensure(paths::SUBMIT, response, is_submit_success).await?;
        info!("✓ 稿件已提交到 {}", payload.journal_selection);
        Ok(())
    }
}

/// 解析转换接口的响应，缺少地址时视为失败
pub fn parse_pdf_url(body: &str) -> AppResult<String> {
    let parsed: ConvertResponse = serde_json::from_str(body)?;
    parsed
        .pdf_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| {
            ApiError::MissingField {
                endpoint: paths::CONVERT_TO_PDF.to_string(),
                field: "pdfUrl".to_string(),
            }
            .into()
        })
}
