//! 富文本（编辑器输出的 HTML 片段）辅助函数

use regex::Regex;
use std::sync::OnceLock;

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("静态正则表达式"))
}

/// 去掉标签后的可见文本
pub fn plain_text(html: &str) -> String {
    let stripped = tag_regex().replace_all(html, " ");
    stripped
        .replace("&nbsp;", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 没有任何可见文本（空编辑器会产生 `<p><br></p>`）
pub fn is_blank(html: &str) -> bool {
    plain_text(html).is_empty()
}
