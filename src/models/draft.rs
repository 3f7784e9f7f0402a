use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::file_kind;
use crate::models::orcid;
use crate::models::rich_text;

/// 通讯作者信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInfo {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// 合著者
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoAuthor {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

impl CoAuthor {
    /// 合著者 ORCID 主页链接（ORCID 不完整时没有）
    pub fn orcid_profile_url(&self) -> Option<String> {
        self.orcid.as_deref().and_then(orcid::profile_url)
    }
}

/// 作者是否持有 ORCID（三态，未选择时不能进入下一步）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrcidChoice {
    #[default]
    Unset,
    Yes,
    No,
}

/// 稿件元数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub short_title: String,
    /// 摘要（富文本）
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    /// 逗号分隔的关键词
    #[serde(default, deserialize_with = "deserialize_keywords")]
    pub keywords: String,
}

impl Metadata {
    /// 标题和摘要都为空（自动提取的触发条件之一）
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && rich_text::is_blank(&self.abstract_text)
    }

    /// 拆分后的关键词列表
    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .split(',')
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(|k| k.to_string())
            .collect()
    }
}

// 后端既可能返回 "a, b" 也可能返回 ["a", "b"]
fn deserialize_keywords<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{SeqAccess, Visitor};

    struct KeywordsVisitor;

    impl<'de> Visitor<'de> for KeywordsVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a comma-separated string or a list of keywords")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(String::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(String::new())
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut keywords = Vec::new();
            while let Some(keyword) = seq.next_element::<String>()? {
                let keyword = keyword.trim().to_string();
                if !keyword.is_empty() {
                    keywords.push(keyword);
                }
            }
            Ok(keywords.join(", "))
        }
    }

    deserializer.deserialize_any(KeywordsVisitor)
}

/// 上传的文件（完整内容保存在内存中，直到提交）
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// 根据文件名推断 content type
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = file_kind::content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// 投稿草稿
///
/// 只存在于一次向导会话中，提交成功前不会持久化
#[derive(Debug, Clone, Default)]
pub struct SubmissionDraft {
    pub journal: String,
    /// 已勾选的投稿须知（按勾选顺序，不重复）
    pub requirements: Vec<String>,
    pub author: AuthorInfo,
    pub orcid_choice: OrcidChoice,
    pub co_authors: Vec<CoAuthor>,
    pub manuscript: Option<UploadedFile>,
    /// 每次替换稿件文件时递增，用于元数据自动提取的去重
    pub manuscript_revision: u64,
    pub supporting_files: Vec<UploadedFile>,
    /// 投稿信（富文本）
    pub cover_letter: String,
    pub metadata: Metadata,
    pub confirmed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_co_author_profile_url_needs_full_orcid() {
        let mut co_author = CoAuthor {
            full_name: "John Roe".to_string(),
            email: "john@x.com".to_string(),
            orcid: Some("0000-0002-9876-5432".to_string()),
        };
        assert_eq!(
            co_author.orcid_profile_url().as_deref(),
            Some("https://orcid.org/0000000298765432")
        );
        co_author.orcid = Some("0000-0002".to_string());
        assert_eq!(co_author.orcid_profile_url(), None);
        co_author.orcid = None;
        assert_eq!(co_author.orcid_profile_url(), None);
    }

    #[test]
    fn test_metadata_keywords_accept_string_or_list() {
        let from_list: Metadata = serde_json::from_value(serde_json::json!({
            "title": "T",
            "shortTitle": "S",
            "abstract": "A",
            "keywords": ["sepsis", " triage ", ""]
        }))
        .unwrap();
        assert_eq!(from_list.keywords, "sepsis, triage");
        assert_eq!(from_list.abstract_text, "A");

        let from_string: Metadata =
            serde_json::from_value(serde_json::json!({ "title": "T", "keywords": "a, b" }))
                .unwrap();
        assert_eq!(from_string.keyword_list(), vec!["a", "b"]);
        assert!(from_string.short_title.is_empty());
    }

    #[test]
    fn test_metadata_serializes_abstract_key() {
        let metadata = Metadata {
            title: "T".to_string(),
            abstract_text: "A".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["abstract"], "A");
        assert_eq!(json["shortTitle"], "");
    }

    #[test]
    fn test_metadata_is_empty_ignores_editor_markup() {
        let metadata = Metadata {
            abstract_text: "<p><br></p>".to_string(),
            ..Default::default()
        };
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_author_info_omits_missing_orcid() {
        let author = AuthorInfo {
            full_name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&author).unwrap();
        assert_eq!(json["fullName"], "Jane Doe");
        assert!(json.get("orcid").is_none());
    }
}
