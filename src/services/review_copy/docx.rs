//! DOCX 处理
//!
//! - 提取正文纯文本（按段落）
//! - 行号改写：在节属性中写入 `w:lnNumType`，并让每个段落都参与行号编排
//!
//! 行号改写是纯函数 `(bytes) -> bytes`，不会修改传入的原始文件

use std::io::{Cursor, Read, Write};

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{AppError, AppResult, DocumentError};

/// 正文所在的 XML 部件
pub const DOCUMENT_PART: &str = "word/document.xml";

/// 行号设置：每行计数、从 1 开始、距正文 720 twips（0.5 英寸）、全文连续
const LINE_NUMBERING_ATTRS: [(&str, &str); 4] = [
    ("w:countBy", "1"),
    ("w:start", "1"),
    ("w:distance", "720"),
    ("w:restart", "continuous"),
];

/// `w:pPr` 中排在 `w:suppressLineNumbers` 之前的元素
const PPR_BEFORE_SUPPRESS: [&[u8]; 7] = [
    b"w:pStyle",
    b"w:keepNext",
    b"w:keepLines",
    b"w:pageBreakBefore",
    b"w:framePr",
    b"w:widowControl",
    b"w:numPr",
];

/// `w:sectPr` 中排在 `w:lnNumType` 之前的元素
const SECTPR_BEFORE_LN_NUM: [&[u8]; 9] = [
    b"w:headerReference",
    b"w:footerReference",
    b"w:footnotePr",
    b"w:endnotePr",
    b"w:type",
    b"w:pgSz",
    b"w:pgMar",
    b"w:paperSrc",
    b"w:pgBorders",
];

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> AppResult<String> {
    let mut part = archive.by_name(name).map_err(|e| match e {
        ZipError::FileNotFound => AppError::Document(DocumentError::MissingPart(name.to_string())),
        other => other.into(),
    })?;
    let mut xml = String::new();
    part.read_to_string(&mut xml).map_err(AppError::xml)?;
    Ok(xml)
}

fn read_document_xml(bytes: &[u8]) -> AppResult<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    read_part(&mut archive, DOCUMENT_PART)
}

// ========== 纯文本提取 ==========

/// 按段落提取正文文本
///
/// `w:tab` 转为制表符，`w:br` / `w:cr` 转为换行；修订中被删除的文字（`w:delText`）不计入
pub fn extract_paragraphs(bytes: &[u8]) -> AppResult<Vec<String>> {
    let xml = read_document_xml(bytes)?;
    paragraphs_from_xml(&xml)
}

/// 提取全文，段落之间以空行分隔
pub fn extract_raw_text(bytes: &[u8]) -> AppResult<String> {
    Ok(extract_paragraphs(bytes)?.join("\n\n"))
}

fn paragraphs_from_xml(xml: &str) -> AppResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    // 文本框里可以嵌套段落
    let mut open: Vec<String> = Vec::new();
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(AppError::xml)? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => open.push(String::new()),
                b"w:r" => run_depth += 1,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" if run_depth > 0 => push_text(&mut open, "\t"),
                b"w:br" | b"w:cr" if run_depth > 0 => push_text(&mut open, "\n"),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(AppError::xml)?;
                push_text(&mut open, &text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    if let Some(paragraph) = open.pop() {
                        paragraphs.push(paragraph);
                    }
                }
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push_text(open: &mut [String], text: &str) {
    if let Some(current) = open.last_mut() {
        current.push_str(text);
    }
}

// ========== 行号改写 ==========

enum Node {
    Element(Element),
    Other(Event<'static>),
}

struct Element {
    start: BytesStart<'static>,
    children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    fn new(name: &'static str) -> Self {
        Self {
            start: BytesStart::new(name),
            children: Vec::new(),
            self_closing: true,
        }
    }

    fn name(&self) -> &[u8] {
        self.start.name().into_inner()
    }

    fn is(&self, name: &[u8]) -> bool {
        self.name() == name
    }

    /// 删除所有指定名称的直接子元素
    fn remove_children(&mut self, name: &[u8]) {
        self.children
            .retain(|node| !matches!(node, Node::Element(el) if el.is(name)));
    }

    /// 插入到 `before` 列表中最后一个元素之后（保持 schema 顺序）
    fn insert_after_last_of(&mut self, before: &[&[u8]], node: Node) {
        let position = self
            .children
            .iter()
            .enumerate()
            .filter(|(_, child)| {
                matches!(child, Node::Element(el) if before.iter().any(|name| *name == el.name()))
            })
            .map(|(index, _)| index + 1)
            .last()
            .unwrap_or(0);
        self.children.insert(position, node);
        self.self_closing = false;
    }
}

fn parse_tree(xml: &str) -> AppResult<Vec<Node>> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut roots = Vec::new();

    loop {
        let event = reader.read_event().map_err(AppError::xml)?;
        let node = match event {
            Event::Start(start) => {
                stack.push(Element {
                    start: start.into_owned(),
                    children: Vec::new(),
                    self_closing: false,
                });
                continue;
            }
            Event::Empty(start) => Node::Element(Element {
                start: start.into_owned(),
                children: Vec::new(),
                self_closing: true,
            }),
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| AppError::xml("多余的结束标签"))?;
                Node::Element(element)
            }
            Event::Eof => break,
            other => Node::Other(other.into_owned()),
        };

        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }

    if !stack.is_empty() {
        return Err(AppError::xml("存在未闭合的元素"));
    }
    Ok(roots)
}

fn write_nodes<W: Write>(writer: &mut Writer<W>, nodes: &[Node]) -> AppResult<()> {
    for node in nodes {
        match node {
            Node::Element(el) if el.self_closing && el.children.is_empty() => {
                writer
                    .write_event(Event::Empty(el.start.clone()))
                    .map_err(AppError::xml)?;
            }
            Node::Element(el) => {
                writer
                    .write_event(Event::Start(el.start.clone()))
                    .map_err(AppError::xml)?;
                write_nodes(writer, &el.children)?;
                writer
                    .write_event(Event::End(el.start.to_end()))
                    .map_err(AppError::xml)?;
            }
            Node::Other(event) => {
                writer.write_event(event.clone()).map_err(AppError::xml)?;
            }
        }
    }
    Ok(())
}

fn line_numbering_element() -> Element {
    let mut element = Element::new("w:lnNumType");
    for attr in LINE_NUMBERING_ATTRS {
        element.start.push_attribute(attr);
    }
    element
}

fn allow_line_numbers_element() -> Element {
    let mut element = Element::new("w:suppressLineNumbers");
    element.start.push_attribute(("w:val", "0"));
    element
}

fn number_section(sect_pr: &mut Element) {
    sect_pr.remove_children(b"w:lnNumType");
    sect_pr.insert_after_last_of(&SECTPR_BEFORE_LN_NUM, Node::Element(line_numbering_element()));
}

fn number_paragraph(paragraph: &mut Element) {
    let has_ppr = paragraph
        .children
        .iter()
        .any(|node| matches!(node, Node::Element(el) if el.is(b"w:pPr")));
    if !has_ppr {
        paragraph
            .children
            .insert(0, Node::Element(Element::new("w:pPr")));
        paragraph.self_closing = false;
    }

    for node in paragraph.children.iter_mut() {
        if let Node::Element(ppr) = node {
            if ppr.is(b"w:pPr") {
                ppr.remove_children(b"w:suppressLineNumbers");
                ppr.insert_after_last_of(
                    &PPR_BEFORE_SUPPRESS,
                    Node::Element(allow_line_numbers_element()),
                );
                break;
            }
        }
    }
}

/// 递归处理，返回遇到的 `w:sectPr` 数量
fn number_nodes(nodes: &mut [Node]) -> usize {
    let mut sections = 0;
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            if el.is(b"w:p") {
                number_paragraph(el);
            } else if el.is(b"w:sectPr") {
                number_section(el);
                sections += 1;
            }
            sections += number_nodes(&mut el.children);
        }
    }
    sections
}

fn find_body(nodes: &mut [Node]) -> Option<&mut Element> {
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            if el.is(b"w:body") {
                return Some(el);
            }
            if let Some(body) = find_body(&mut el.children) {
                return Some(body);
            }
        }
    }
    None
}

/// 改写 document.xml 文本
pub fn number_document_xml(xml: &str) -> AppResult<String> {
    let mut tree = parse_tree(xml)?;

    let body = find_body(&mut tree)
        .ok_or_else(|| AppError::Document(DocumentError::MissingPart("w:body".to_string())))?;

    let sections = number_nodes(&mut body.children);
    if sections == 0 {
        let mut sect_pr = Element::new("w:sectPr");
        number_section(&mut sect_pr);
        body.children.push(Node::Element(sect_pr));
        body.self_closing = false;
    }

    let mut writer = Writer::new(Vec::new());
    write_nodes(&mut writer, &tree)?;
    String::from_utf8(writer.into_inner()).map_err(AppError::xml)
}

/// 为 DOCX 加上原生行号，返回新的 DOCX 字节
///
/// 除 `word/document.xml` 外，其余部件原样拷贝
pub fn number_lines(bytes: &[u8]) -> AppResult<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let numbered = number_document_xml(&read_part(&mut archive, DOCUMENT_PART)?)?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for index in 0..archive.len() {
        let name = archive.by_index_raw(index)?.name().to_string();
        if name == DOCUMENT_PART {
            writer.start_file(name, options)?;
            writer
                .write_all(numbered.as_bytes())
                .map_err(|e| AppError::Document(DocumentError::Container(e.into())))?;
        } else {
            writer.raw_copy_file(archive.by_index_raw(index)?)?;
        }
    }

    Ok(writer.finish()?.into_inner())
}
