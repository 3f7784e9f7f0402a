use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::error::AppResult;
use crate::models::{Metadata, UploadedFile};
use crate::services::review_copy::{docx, layout};

use super::MetadataExtractor;

/// 本地启发式提取
///
/// 在正文（Introduction / Background）之前的段落里查找：
/// - 标题：第一个不是标签行的段落
/// - 短标题：`Running title:` / `Short title:` / `Running head:`
/// - 摘要：`Abstract` 标题后的段落，或 `Abstract:` 之后的文字
/// - 关键词：`Keywords:` / `Key words:`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMetadataExtractor;

fn short_title_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:running\s+title|short\s+title|running\s+head)\s*[:：]\s*(.*)$")
            .expect("valid short title regex")
    })
}

fn abstract_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^(?:abstract|summary)\s*(?:[:：.\-]\s*(.*)|$)")
            .expect("valid abstract regex")
    })
}

fn keywords_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^key\s*words?\s*[:：]\s*(.*)$").expect("valid keywords regex")
    })
}

fn is_label(paragraph: &str) -> bool {
    short_title_label().is_match(paragraph)
        || abstract_label().is_match(paragraph)
        || keywords_label().is_match(paragraph)
}

fn normalize_keywords(raw: &str) -> String {
    raw.split([',', ';', '；', '，'])
        .map(|k| k.trim().trim_end_matches('.'))
        .filter(|k| !k.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn capture(re: &Regex, paragraph: &str) -> Option<String> {
    re.captures(paragraph)
        .map(|c| c.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default())
}

/// 从段落文本推断元数据
pub fn infer_metadata(paragraphs: &[String]) -> Metadata {
    let paragraphs: Vec<&str> = paragraphs
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();

    let mut metadata = Metadata::default();
    let mut abstract_pending = false;

    for paragraph in paragraphs {
        if layout::is_body_heading(paragraph) {
            break;
        }

        if let Some(short) = capture(short_title_label(), paragraph) {
            metadata.short_title = short;
            abstract_pending = false;
        } else if let Some(keywords) = capture(keywords_label(), paragraph) {
            metadata.keywords = normalize_keywords(&keywords);
            abstract_pending = false;
        } else if let Some(inline) = capture(abstract_label(), paragraph) {
            if inline.is_empty() {
                abstract_pending = true;
            } else {
                metadata.abstract_text = inline;
            }
        } else if abstract_pending {
            if !metadata.abstract_text.is_empty() {
                metadata.abstract_text.push_str("\n\n");
            }
            metadata.abstract_text.push_str(paragraph);
        } else if metadata.title.is_empty() {
            metadata.title = paragraph.to_string();
        }
    }

    metadata
}

#[async_trait]
impl MetadataExtractor for LocalMetadataExtractor {
    async fn extract(&self, manuscript: &UploadedFile) -> AppResult<Metadata> {
        info!("🔍 本地提取元数据: {}", manuscript.file_name);
        let paragraphs = docx::extract_paragraphs(&manuscript.bytes)?;
        debug!("共 {} 个段落", paragraphs.len());
        Ok(infer_metadata(&paragraphs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::review_copy::docx::fixtures::docx_from_paragraphs;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_infer_metadata_from_front_matter() {
        let metadata = infer_metadata(&lines(&[
            "Early Warning Scores in Sepsis",
            "Running title: Sepsis scores",
            "Jane Doe, John Roe",
            "Abstract",
            "We compared three scores.",
            "They differ.",
            "Keywords: sepsis; triage, scores.",
            "1. Introduction",
            "Abstract: this is not front matter",
        ]));

        assert_eq!(metadata.title, "Early Warning Scores in Sepsis");
        assert_eq!(metadata.short_title, "Sepsis scores");
        assert_eq!(
            metadata.abstract_text,
            "We compared three scores.\n\nThey differ."
        );
        assert_eq!(metadata.keywords, "sepsis, triage, scores");
    }

    #[test]
    fn test_inline_abstract_and_missing_parts() {
        let metadata = infer_metadata(&lines(&["", "Title", "ABSTRACT: Short summary."]));
        assert_eq!(metadata.title, "Title");
        assert_eq!(metadata.abstract_text, "Short summary.");
        assert!(metadata.keywords.is_empty());
        assert!(metadata.short_title.is_empty());

        // 以 Abstract 开头的普通单词不算标签
        assert!(!is_label("Abstraction layers"));
    }

    #[tokio::test]
    async fn test_extract_reads_docx() {
        let file = UploadedFile::new(
            "paper.docx",
            docx_from_paragraphs(&["A Title", "Abstract: text", "Key words: a, b", "Background"]),
        );
        let metadata = LocalMetadataExtractor.extract(&file).await.unwrap();
        assert_eq!(metadata.title, "A Title");
        assert_eq!(metadata.abstract_text, "text");
        assert_eq!(metadata.keyword_list(), vec!["a", "b"]);
    }
}
