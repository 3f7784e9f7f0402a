//! 审稿版排版：分段、定位正文、按宽度折行、分页
//!
//! 坐标使用 PDF 用户空间（点，原点在左下角）

use regex::Regex;
use std::sync::OnceLock;

/// 排版参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub font_size: f32,
    pub margin: f32,
    /// 行号列宽度
    pub number_width: f32,
    /// 行号与正文之间的间距
    pub gap: f32,
    /// 段首缩进
    pub first_line_indent: f32,
    /// 等宽字体的字宽（em）
    pub char_width_em: f32,
}

impl Default for ReviewLayout {
    fn default() -> Self {
        // A4
        Self {
            page_width: 595.28,
            page_height: 841.89,
            font_size: 12.0,
            margin: 50.0,
            number_width: 30.0,
            gap: 10.0,
            first_line_indent: 20.0,
            char_width_em: 0.6,
        }
    }
}

impl ReviewLayout {
    /// 双倍行距
    pub fn line_advance(&self) -> f32 {
        self.font_size * 2.0
    }

    pub fn text_x(&self) -> f32 {
        self.margin + self.number_width + self.gap
    }

    /// 正文可用宽度
    pub fn available_width(&self) -> f32 {
        self.page_width - self.text_x() - self.margin
    }

    pub fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width_em * self.font_size
    }

    fn top(&self) -> f32 {
        self.page_height - self.margin
    }

    /// 低于该位置就要换页
    fn bottom_limit(&self) -> f32 {
        self.margin + self.font_size
    }
}

/// 已定位的一行
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    /// 全文连续行号，从 1 开始
    pub number: usize,
    pub text: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub lines: Vec<PlacedLine>,
}

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid paragraph regex"))
}

fn numbered_introduction() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s*introduction").expect("valid heading regex"))
}

/// 按空行拆分段落，丢弃空白段
pub fn split_paragraphs(text: &str) -> Vec<String> {
    paragraph_break()
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// 是否是正文起始段（Introduction / Background / "1. Introduction"）
pub fn is_body_heading(paragraph: &str) -> bool {
    let lower = paragraph.trim().to_lowercase();
    lower.contains("introduction")
        || lower.contains("background")
        || numbered_introduction().is_match(&lower)
}

/// 跳过题名、作者、摘要等前置内容；找不到时从第一段开始
pub fn locate_body_start(paragraphs: &[String]) -> usize {
    paragraphs
        .iter()
        .position(|p| is_body_heading(p))
        .unwrap_or(0)
}

/// 按宽度折行
///
/// 单个单词超出整行宽度时独占一行，不做断词
pub fn wrap_paragraph(
    paragraph: &str,
    first_line_width: f32,
    line_width: f32,
    layout: &ReviewLayout,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in paragraph.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        let limit = if lines.is_empty() {
            first_line_width
        } else {
            line_width
        };

        if layout.text_width(&candidate) > limit && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// 将全文排版成若干页
///
/// 至少返回一页；行号跨页连续，每段之后空一行
pub fn paginate(text: &str, layout: &ReviewLayout) -> Vec<LaidOutPage> {
    let paragraphs = split_paragraphs(text);
    let start = locate_body_start(&paragraphs);

    let mut pages = vec![LaidOutPage::default()];
    let mut y = layout.top();
    let mut number = 0usize;
    let width = layout.available_width();

    for paragraph in &paragraphs[start..] {
        let lines = wrap_paragraph(paragraph, width - layout.first_line_indent, width, layout);
        for (index, line) in lines.into_iter().enumerate() {
            if y < layout.bottom_limit() {
                pages.push(LaidOutPage::default());
                y = layout.top();
            }

            number += 1;
            let indent = if index == 0 {
                layout.first_line_indent
            } else {
                0.0
            };
            if let Some(page) = pages.last_mut() {
                page.lines.push(PlacedLine {
                    number,
                    text: line,
                    x: layout.text_x() + indent,
                    y,
                });
            }
            y -= layout.line_advance();
        }
        y -= layout.line_advance();
    }

    pages
}
