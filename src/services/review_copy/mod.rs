//! 审稿版生成
//!
//! 两条路径共用同一个接口 [`ReviewCopyGenerator`]：
//! - [`LocalPaginator`]：本地提取文字并排版成带行号的 PDF
//! - [`RemoteConverter`]：在 DOCX 中写入原生行号后交给后端转换，返回托管 PDF 地址
//!
//! 两者都不会修改原始上传文件

pub mod docx;
pub mod layout;
pub mod pdf;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clients::SubmissionApi;
use crate::error::{AppError, AppResult, DocumentError, FileError};
use crate::models::file_kind;
use crate::models::UploadedFile;

pub use layout::{LaidOutPage, PlacedLine, ReviewLayout};

/// 本地生成的审稿版默认文件名
pub const REVIEW_COPY_FILE_NAME: &str = "review-ready-manuscript.pdf";

/// 生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCopy {
    /// 本地生成的文件
    Document { file_name: String, bytes: Vec<u8> },
    /// 由转换服务托管的 PDF
    Hosted { url: String },
}

#[async_trait]
pub trait ReviewCopyGenerator: Send + Sync {
    async fn generate(&self, manuscript: &UploadedFile) -> AppResult<ReviewCopy>;
}

fn ensure_docx(manuscript: &UploadedFile) -> AppResult<()> {
    if file_kind::is_manuscript(&manuscript.file_name) {
        Ok(())
    } else {
        Err(FileError::UnsupportedType {
            file_name: manuscript.file_name.clone(),
            expected: format!(".{}", file_kind::MANUSCRIPT_EXTENSION),
        }
        .into())
    }
}

/// 本地排版（不依赖网络）
#[derive(Debug, Clone, Default)]
pub struct LocalPaginator {
    layout: ReviewLayout,
}

impl LocalPaginator {
    pub fn new(layout: ReviewLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ReviewLayout {
        &self.layout
    }

    /// DOCX 字节 -> PDF 字节
    pub fn render(&self, docx_bytes: &[u8]) -> AppResult<Vec<u8>> {
        let text = docx::extract_raw_text(docx_bytes)?;
        if layout::split_paragraphs(&text).is_empty() {
            return Err(DocumentError::EmptyBody.into());
        }

        let pages = layout::paginate(&text, &self.layout);
        let line_count: usize = pages.iter().map(|p| p.lines.len()).sum();
        debug!("排版完成: {} 页, {} 行", pages.len(), line_count);

        pdf::render_pdf(&pages, &self.layout)
    }
}

#[async_trait]
impl ReviewCopyGenerator for LocalPaginator {
    async fn generate(&self, manuscript: &UploadedFile) -> AppResult<ReviewCopy> {
        ensure_docx(manuscript)?;
        info!("📄 本地生成审稿版: {}", manuscript.file_name);
        let bytes = self.render(&manuscript.bytes)?;
        info!("✓ 审稿版已生成 ({} 字节)", bytes.len());
        Ok(ReviewCopy::Document {
            file_name: REVIEW_COPY_FILE_NAME.to_string(),
            bytes,
        })
    }
}

/// 远程转换：写入行号后上传
#[derive(Clone)]
pub struct RemoteConverter {
    api: Arc<dyn SubmissionApi>,
}

impl RemoteConverter {
    pub fn new(api: Arc<dyn SubmissionApi>) -> Self {
        Self { api }
    }

    /// 上传的文件名：`paper.docx` -> `paper-numbered.docx`
    fn numbered_file_name(file_name: &str) -> String {
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => format!("{}-numbered.{}", stem, ext),
            _ => format!("{}-numbered", file_name),
        }
    }

    /// 返回托管 PDF 的地址
    pub async fn convert(&self, manuscript: &UploadedFile) -> AppResult<String> {
        ensure_docx(manuscript)?;
        let numbered = docx::number_lines(&manuscript.bytes)?;
        debug!(
            "行号写入完成: {} -> {} 字节",
            manuscript.len(),
            numbered.len()
        );

        let file_name = Self::numbered_file_name(&manuscript.file_name);
        self.api.convert_to_pdf(&file_name, numbered).await
    }
}

#[async_trait]
impl ReviewCopyGenerator for RemoteConverter {
    async fn generate(&self, manuscript: &UploadedFile) -> AppResult<ReviewCopy> {
        info!("🌐 远程转换审稿版: {}", manuscript.file_name);
        let url = self.convert(manuscript).await?;
        info!("✓ PDF 地址: {}", url);
        Ok(ReviewCopy::Hosted { url })
    }
}

/// 预览生成状态（Review 步骤）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PreviewState {
    #[default]
    Idle,
    Generating,
    Ready { url: String },
}

impl PreviewState {
    pub fn url(&self) -> Option<&str> {
        match self {
            PreviewState::Ready { url } => Some(url.as_str()),
            _ => None,
        }
    }
}

/// 预览生成失败
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Please upload your manuscript file first.")]
    NoManuscript,
    #[error("The PDF preview is available on the review step only.")]
    NotOnReview,
    #[error("Failed to generate PDF. Please try again.")]
    Failed(#[source] AppError),
}

impl PreviewState {
    /// 执行一次生成；失败时回到 Idle，不自动重试
    pub async fn generate(
        &mut self,
        converter: &RemoteConverter,
        manuscript: &UploadedFile,
    ) -> Result<String, PreviewError> {
        *self = PreviewState::Generating;
        match converter.convert(manuscript).await {
            Ok(url) => {
                *self = PreviewState::Ready { url: url.clone() };
                Ok(url)
            }
            Err(e) => {
                warn!("⚠️  预览生成失败: {}", e);
                *self = PreviewState::Idle;
                Err(PreviewError::Failed(e))
            }
        }
    }
}
