/// 期刊信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journal {
    pub name: String,
    pub description: String,
    /// 尚未开放投稿的期刊在界面上不可选
    pub disabled: bool,
}

impl Journal {
    pub fn new(name: impl Into<String>, description: impl Into<String>, disabled: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            disabled,
        }
    }
}

/// 可投稿期刊列表（固定、有序）
#[derive(Debug, Clone)]
pub struct JournalCatalog {
    journals: Vec<Journal>,
}

impl JournalCatalog {
    pub fn new(journals: Vec<Journal>) -> Self {
        Self { journals }
    }

    /// 按名称精确查找
    pub fn find(&self, name: &str) -> Option<&Journal> {
        self.journals.iter().find(|j| j.name == name)
    }

    /// 名称存在且未被禁用
    pub fn is_selectable(&self, name: &str) -> bool {
        self.find(name).map(|j| !j.disabled).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Journal> {
        self.journals.iter()
    }

    /// 当前开放投稿的期刊
    pub fn enabled(&self) -> impl Iterator<Item = &Journal> {
        self.journals.iter().filter(|j| !j.disabled)
    }
}

impl Default for JournalCatalog {
    fn default() -> Self {
        Self::new(vec![
            Journal::new(
                "Journal of Best Available Evidence in Medicine",
                "Covering all aspects of medical research and clinical practice",
                false,
            ),
            Journal::new(
                "Engineering Sustainability and Green Technologies (ESGT) Journal",
                "Coming Soon - A journal focused on engineering research and applications.",
                true,
            ),
            Journal::new(
                "International University Journal- Humanities",
                "Coming Soon - A journal exploring humanities and social sciences.",
                true,
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_has_one_open_journal() {
        let catalog = JournalCatalog::default();
        let open: Vec<_> = catalog.enabled().map(|j| j.name.as_str()).collect();
        assert_eq!(open, vec!["Journal of Best Available Evidence in Medicine"]);
    }

    #[test]
    fn test_disabled_and_unknown_are_not_selectable() {
        let catalog = JournalCatalog::default();
        assert!(!catalog.is_selectable("International University Journal- Humanities"));
        assert!(!catalog.is_selectable("Nature"));
        assert!(catalog.is_selectable("Journal of Best Available Evidence in Medicine"));
    }
}
