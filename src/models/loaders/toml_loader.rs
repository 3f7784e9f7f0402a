use crate::error::{AppError, FileError};
use crate::models::draft::{CoAuthor, Metadata, OrcidChoice, UploadedFile};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// TOML 草稿描述文件
///
/// 文件路径均相对于 TOML 文件所在目录
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftFile {
    pub journal: String,
    /// 一次性勾选全部投稿须知
    #[serde(default)]
    pub accept_all_requirements: bool,
    /// 逐条勾选（与 accept_all_requirements 二选一）
    #[serde(default)]
    pub requirements: Vec<String>,
    pub author: DraftAuthor,
    #[serde(default)]
    pub co_authors: Vec<DraftCoAuthor>,
    pub manuscript: PathBuf,
    #[serde(default)]
    pub supporting_files: Vec<PathBuf>,
    #[serde(default)]
    pub cover_letter: String,
    #[serde(default)]
    pub metadata: Option<DraftMetadata>,
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftAuthor {
    pub full_name: String,
    pub email: String,
    /// 不填表示作者没有 ORCID，需要走邮箱验证
    #[serde(default)]
    pub orcid: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftCoAuthor {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub orcid: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub short_title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl DraftAuthor {
    pub fn orcid_choice(&self) -> OrcidChoice {
        match self.orcid.as_deref().map(str::trim) {
            Some(orcid) if !orcid.is_empty() => OrcidChoice::Yes,
            _ => OrcidChoice::No,
        }
    }
}

impl DraftCoAuthor {
    pub fn to_co_author(&self) -> CoAuthor {
        CoAuthor {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            orcid: self.orcid.clone().filter(|o| !o.trim().is_empty()),
        }
    }
}

impl DraftMetadata {
    pub fn to_metadata(&self) -> Metadata {
        Metadata {
            title: self.title.clone(),
            short_title: self.short_title.clone(),
            abstract_text: self.abstract_text.clone(),
            keywords: self.keywords.join(", "),
        }
    }
}

/// 已加载的草稿：描述 + 读入内存的文件
#[derive(Debug, Clone)]
pub struct LoadedDraft {
    pub spec: DraftFile,
    pub manuscript: UploadedFile,
    pub supporting_files: Vec<UploadedFile>,
    pub file_path: PathBuf,
}

/// 读取单个上传文件
pub async fn load_uploaded_file(path: &Path) -> Result<UploadedFile> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .with_context(|| format!("无效的文件路径: {}", path.display()))?;

    Ok(UploadedFile::new(file_name, bytes))
}

/// 从 TOML 文件加载草稿，并读入其中引用的稿件和附件
pub async fn load_draft_file(toml_file_path: &Path) -> Result<LoadedDraft> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(toml_file_path.display().to_string(), e))?;

    let spec: DraftFile = toml::from_str(&content).map_err(|source| {
        AppError::File(FileError::TomlParseFailed {
            path: toml_file_path.display().to_string(),
            source,
        })
    })?;

    let base_dir = toml_file_path.parent().unwrap_or_else(|| Path::new("."));

    let manuscript = load_uploaded_file(&base_dir.join(&spec.manuscript)).await?;
    tracing::info!(
        "已加载稿件: {} ({} 字节)",
        manuscript.file_name,
        manuscript.len()
    );

    let mut supporting_files = Vec::with_capacity(spec.supporting_files.len());
    for path in &spec.supporting_files {
        let file = load_uploaded_file(&base_dir.join(path)).await?;
        tracing::info!("已加载附件: {}", file.file_name);
        supporting_files.push(file);
    }

    Ok(LoadedDraft {
        spec,
        manuscript,
        supporting_files,
        file_path: toml_file_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_draft_file_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("paper.docx"), b"docx-bytes").unwrap();
        std::fs::write(dir.path().join("fig1.png"), b"png").unwrap();
        std::fs::write(
            dir.path().join("draft.toml"),
            r#"
journal = "Journal of Best Available Evidence in Medicine"
accept_all_requirements = true
manuscript = "paper.docx"
supporting_files = ["fig1.png"]
cover_letter = "Please review"
confirmed = true

[author]
full_name = "Jane Doe"
email = "jane@x.com"
orcid = "0000-0001-2345-6789"

[[co_authors]]
full_name = "John Roe"
email = "john@x.com"

[metadata]
title = "T"
abstract = "A"
keywords = ["k1", "k2"]
"#,
        )
        .unwrap();

        let loaded = load_draft_file(&dir.path().join("draft.toml")).await.unwrap();
        assert_eq!(loaded.manuscript.file_name, "paper.docx");
        assert_eq!(loaded.manuscript.bytes, b"docx-bytes");
        assert_eq!(loaded.supporting_files[0].content_type, "image/png");
        assert_eq!(loaded.spec.author.orcid_choice(), OrcidChoice::Yes);
        assert_eq!(loaded.spec.co_authors[0].to_co_author().orcid, None);
        let metadata = loaded.spec.metadata.as_ref().unwrap().to_metadata();
        assert_eq!(metadata.keywords, "k1, k2");
    }

    #[tokio::test]
    async fn test_missing_manuscript_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("draft.toml"),
            r#"
journal = "J"
manuscript = "missing.docx"

[author]
full_name = "Jane Doe"
email = "jane@x.com"
"#,
        )
        .unwrap();

        let err = load_draft_file(&dir.path().join("draft.toml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing.docx"));
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::File(FileError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.toml");
        std::fs::write(&path, "journal = \"J\"\nmanuscript = ").unwrap();

        let err = load_draft_file(&path).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::File(FileError::TomlParseFailed { .. }))
        ));
    }
}
