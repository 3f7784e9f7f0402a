mod common;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use common::*;
use manuscript_submit::clients::SubmissionApi;
use manuscript_submit::config::{Config, ExtractionMode};
use manuscript_submit::error::{AppError, FileError};
use manuscript_submit::orchestrator::{number_lines_file, App, CodePrompt};
use manuscript_submit::services::review_copy::docx;

const JOURNAL: &str = "Journal of Best Available Evidence in Medicine";

/// 按顺序给出预设的输入，用完后放弃
struct ScriptedPrompt {
    inputs: VecDeque<&'static str>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    fn new(inputs: &[&'static str]) -> Self {
        Self {
            inputs: inputs.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

#[async_trait]
impl CodePrompt for ScriptedPrompt {
    async fn read_code(&mut self, email: &str) -> Result<Option<String>> {
        self.asked.push(email.to_string());
        Ok(self.inputs.pop_front().map(str::to_string))
    }
}

fn write_draft(dir: &Path, orcid: Option<&str>, confirmed: bool) {
    std::fs::write(dir.join("paper.docx"), docx(&sample_paragraphs())).unwrap();
    std::fs::write(dir.join("data.csv"), b"a,b\n1,2\n").unwrap();

    let orcid_line = orcid
        .map(|o| format!("orcid = \"{}\"\n", o))
        .unwrap_or_default();
    let draft = format!(
        r#"
journal = "{JOURNAL}"
accept_all_requirements = true
manuscript = "paper.docx"
supporting_files = ["data.csv"]
cover_letter = "<p>Dear editor</p>"
confirmed = {confirmed}

[author]
full_name = "Jane Doe"
email = "jane@x.com"
{orcid_line}
[[co_authors]]
full_name = "John Roe"
email = "john@x.com"
orcid = "0000000298765432"
"#
    );
    std::fs::write(dir.join("draft.toml"), draft).unwrap();
}

fn app_with(backend: &Arc<FakeBackend>, output_dir: &Path) -> App {
    let config = Config {
        metadata_extraction: ExtractionMode::Local,
        generate_preview: true,
        output_dir: output_dir.to_string_lossy().to_string(),
        ..Config::default()
    };
    let api: Arc<dyn SubmissionApi> = backend.clone();
    App::with_api(config, api)
}

#[tokio::test]
async fn test_submit_draft_with_email_verification_and_local_metadata() {
    let dir = tempfile::tempdir().unwrap();
    write_draft(dir.path(), None, true);
    let backend = FakeBackend::new();
    let app = app_with(&backend, dir.path());

    let mut prompt = ScriptedPrompt::new(&["000000", SENT_CODE]);
    let outcome = app
        .submit_draft(&dir.path().join("draft.toml"), &mut prompt)
        .await
        .unwrap();

    assert_eq!(prompt.asked, vec!["jane@x.com", "jane@x.com"]);
    assert_eq!(
        backend.verify_attempts.lock().unwrap().as_slice(),
        [
            ("jane@x.com".to_string(), "000000".to_string()),
            ("jane@x.com".to_string(), SENT_CODE.to_string()),
        ]
    );

    assert_eq!(outcome.journal, JOURNAL);
    assert_eq!(outcome.title, "Early Warning Scores in Sepsis");
    assert_eq!(outcome.message, "Manuscript submitted successfully!");
    assert_eq!(outcome.preview_url.as_deref(), Some(PDF_URL));

    // 本地提取不会调用后端接口
    assert_eq!(backend.extract_count(), 0);

    let payload = backend.last_submission();
    assert_eq!(payload.author_info.orcid, None);
    assert_eq!(payload.metadata.short_title, "Sepsis scores");
    assert_eq!(payload.metadata.keywords, "sepsis, triage");
    assert_eq!(
        payload.co_authors[0].orcid.as_deref(),
        Some("0000-0002-9876-5432")
    );
    assert_eq!(payload.supporting_files[0].file_name, "data.csv");
    assert_eq!(payload.supporting_files[0].content_type, "text/csv");
}

#[tokio::test]
async fn test_submit_draft_with_orcid_skips_verification() {
    let dir = tempfile::tempdir().unwrap();
    write_draft(dir.path(), Some("0000 0001 2345 6789"), true);
    let backend = FakeBackend::new();
    let app = app_with(&backend, dir.path());

    let mut prompt = ScriptedPrompt::new(&[]);
    app.submit_draft(&dir.path().join("draft.toml"), &mut prompt)
        .await
        .unwrap();

    assert!(prompt.asked.is_empty());
    assert!(backend.sent_to.lock().unwrap().is_empty());
    assert_eq!(
        backend.last_submission().author_info.orcid.as_deref(),
        Some("0000-0001-2345-6789")
    );
}

#[tokio::test]
async fn test_giving_up_verification_aborts_without_submitting() {
    let dir = tempfile::tempdir().unwrap();
    write_draft(dir.path(), None, true);
    let backend = FakeBackend::new();
    let app = app_with(&backend, dir.path());

    let mut prompt = ScriptedPrompt::new(&["111111"]);
    let result = app
        .submit_draft(&dir.path().join("draft.toml"), &mut prompt)
        .await;

    assert!(result.is_err());
    assert_eq!(backend.submission_count(), 0);
}

#[tokio::test]
async fn test_unconfirmed_draft_is_not_submitted() {
    let dir = tempfile::tempdir().unwrap();
    write_draft(dir.path(), Some("0000-0001-2345-6789"), false);
    let backend = FakeBackend::new();
    let app = app_with(&backend, dir.path());

    let mut prompt = ScriptedPrompt::new(&[]);
    let result = app
        .submit_draft(&dir.path().join("draft.toml"), &mut prompt)
        .await;

    assert!(result.is_err());
    assert_eq!(backend.submission_count(), 0);
}

#[tokio::test]
async fn test_number_lines_file_writes_numbered_copy() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("paper.docx");
    let output = dir.path().join("out").join("paper-numbered.docx");
    std::fs::write(&input, docx(&sample_paragraphs())).unwrap();

    number_lines_file(&input, &output).await.unwrap();

    let numbered = std::fs::read(&output).unwrap();
    let xml = {
        use std::io::Read;
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(numbered.clone())).unwrap();
        let mut entry = archive.by_name(docx::DOCUMENT_PART).unwrap();
        let mut xml = String::new();
        entry.read_to_string(&mut xml).unwrap();
        xml
    };
    assert!(xml.contains("w:lnNumType"));
    assert_eq!(
        docx::extract_paragraphs(&numbered).unwrap(),
        sample_paragraphs()
    );
    // 原文件不变
    assert_eq!(std::fs::read(&input).unwrap(), docx(&sample_paragraphs()));
}

#[tokio::test]
async fn test_review_copy_writes_pdf_to_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("paper.docx");
    std::fs::write(&input, docx(&sample_paragraphs())).unwrap();
    let backend = FakeBackend::new();
    let app = app_with(&backend, &dir.path().join("output"));

    let path = app.review_copy(&input, None).await.unwrap();

    assert_eq!(
        path,
        dir.path().join("output").join("review-ready-manuscript.pdf")
    );
    let pdf = lopdf::Document::load(&path).unwrap();
    assert_eq!(pdf.get_pages().len(), 1);
}

#[tokio::test]
async fn test_review_copy_rejects_non_docx() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("paper.pdf");
    std::fs::write(&input, b"%PDF-1.4").unwrap();
    let backend = FakeBackend::new();
    let app = app_with(&backend, dir.path());

    assert!(app.review_copy(&input, None).await.is_err());
}

#[tokio::test]
async fn test_number_lines_file_reports_typed_file_errors() {
    let dir = tempfile::tempdir().unwrap();

    let err = number_lines_file(&dir.path().join("absent.docx"), &dir.path().join("out.docx"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::File(FileError::NotFound { .. }))
    ));

    // 输出目录的位置被一个普通文件占用
    let input = dir.path().join("paper.docx");
    std::fs::write(&input, docx(&sample_paragraphs())).unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let err = number_lines_file(&input, &blocker.join("out.docx"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::File(FileError::WriteFailed { .. }))
    ));
}
