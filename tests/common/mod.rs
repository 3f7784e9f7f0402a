#![allow(dead_code)]

use async_trait::async_trait;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use manuscript_submit::clients::{SubmissionApi, SubmissionPayload};
use manuscript_submit::error::{ApiError, AppError, AppResult};
use manuscript_submit::models::{Journal, JournalCatalog, Metadata, UploadedFile};
use manuscript_submit::services::RemoteMetadataExtractor;
use manuscript_submit::workflow::Wizard;

pub const SENT_CODE: &str = "123456";
pub const PDF_URL: &str = "https://files.example/review.pdf";

fn rejected(endpoint: &str, message: &str) -> AppError {
    ApiError::Rejected {
        endpoint: endpoint.to_string(),
        status: 400,
        message: message.to_string(),
    }
    .into()
}

/// 内存中的投稿后端，记录所有调用
#[derive(Default)]
pub struct FakeBackend {
    pub sent_to: Mutex<Vec<String>>,
    pub verify_attempts: Mutex<Vec<(String, String)>>,
    pub extract_calls: AtomicUsize,
    /// None 表示提取失败
    pub extracted: Mutex<Option<Metadata>>,
    pub conversions: Mutex<Vec<(String, Vec<u8>)>>,
    pub submissions: Mutex<Vec<SubmissionPayload>>,
    /// Some 时提交被拒绝，内容为服务端 error 文本
    pub submit_error: Mutex<Option<String>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn extracting(metadata: Metadata) -> Arc<Self> {
        let backend = Self::default();
        *backend.extracted.lock().unwrap() = Some(metadata);
        Arc::new(backend)
    }

    pub fn extract_count(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn last_submission(&self) -> SubmissionPayload {
        self.submissions.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl SubmissionApi for FakeBackend {
    async fn send_verification(&self, email: &str) -> AppResult<()> {
        self.sent_to.lock().unwrap().push(email.to_string());
        Ok(())
    }

    async fn verify_code(&self, email: &str, code: &str) -> AppResult<()> {
        self.verify_attempts
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        let sent = self.sent_to.lock().unwrap().iter().any(|e| e == email);
        if sent && code == SENT_CODE {
            Ok(())
        } else {
            Err(rejected("submissions/verify-code", "Invalid verification code"))
        }
    }

    async fn extract_metadata(&self, _manuscript: &UploadedFile) -> AppResult<Metadata> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        self.extracted
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::Other("extraction service unavailable".to_string()))
    }

    async fn convert_to_pdf(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<String> {
        self.conversions
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes));
        Ok(PDF_URL.to_string())
    }

    async fn submit(&self, payload: &SubmissionPayload) -> AppResult<()> {
        if let Some(message) = self.submit_error.lock().unwrap().clone() {
            return Err(rejected("submissions/submit", &message));
        }
        self.submissions.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

pub fn catalog() -> JournalCatalog {
    JournalCatalog::new(vec![
        Journal::new("Journal A", "Open for submissions", false),
        Journal::new("Journal B", "Coming soon", true),
    ])
}

pub fn wizard_with(backend: &Arc<FakeBackend>) -> Wizard {
    let api: Arc<dyn SubmissionApi> = backend.clone();
    Wizard::new(
        api.clone(),
        Arc::new(RemoteMetadataExtractor::new(api)),
        catalog(),
    )
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

/// 用段落文本拼出一个最小的 DOCX
pub fn docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, p))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#,
        body
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer.write_all(CONTENT_TYPES.as_bytes()).unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn sample_paragraphs() -> Vec<&'static str> {
    vec![
        "Early Warning Scores in Sepsis",
        "Running title: Sepsis scores",
        "Abstract: We compared three early warning scores.",
        "Keywords: sepsis, triage",
        "1. Introduction",
        "Sepsis remains a leading cause of death.",
        "Methods were applied consistently.",
    ]
}

pub fn manuscript() -> UploadedFile {
    UploadedFile::new("paper.docx", docx(&sample_paragraphs()))
}
