//! 用 lopdf 输出审稿版 PDF
//!
//! 字体使用 PDF 内置的 Courier（等宽，无需嵌入字形），文字按 WinAnsi 编码

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use phf::phf_map;

use crate::error::{AppError, AppResult};

use super::layout::{LaidOutPage, ReviewLayout};

const FONT_RESOURCE: &str = "F1";
const NUMBER_GREY: f32 = 0.5;

/// WinAnsi 中 0x80–0x9F 区间的字符
static WIN_ANSI_EXTRAS: phf::Map<char, u8> = phf_map! {
    '€' => 0x80,
    '‚' => 0x82,
    'ƒ' => 0x83,
    '„' => 0x84,
    '…' => 0x85,
    '†' => 0x86,
    '‡' => 0x87,
    'ˆ' => 0x88,
    '‰' => 0x89,
    'Š' => 0x8A,
    '‹' => 0x8B,
    'Œ' => 0x8C,
    'Ž' => 0x8E,
    '‘' => 0x91,
    '’' => 0x92,
    '“' => 0x93,
    '”' => 0x94,
    '•' => 0x95,
    '–' => 0x96,
    '—' => 0x97,
    '˜' => 0x98,
    '™' => 0x99,
    'š' => 0x9A,
    '›' => 0x9B,
    'œ' => 0x9C,
    'ž' => 0x9E,
    'Ÿ' => 0x9F,
};

/// 转为 WinAnsi 字节，无法表示的字符替换为 `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            other => WIN_ANSI_EXTRAS.get(&other).copied().unwrap_or(b'?'),
        })
        .collect()
}

fn show_text(x: f32, y: f32, bytes: Vec<u8>) -> [Operation; 2] {
    [
        Operation::new(
            "Tm",
            vec![
                1.into(),
                0.into(),
                0.into(),
                1.into(),
                x.into(),
                y.into(),
            ],
        ),
        Operation::new("Tj", vec![Object::String(bytes, StringFormat::Literal)]),
    ]
}

fn page_operations(page: &LaidOutPage, layout: &ReviewLayout) -> Vec<Operation> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![FONT_RESOURCE.into(), layout.font_size.into()]),
    ];

    for line in &page.lines {
        operations.push(Operation::new("g", vec![NUMBER_GREY.into()]));
        operations.extend(show_text(
            layout.margin,
            line.y,
            line.number.to_string().into_bytes(),
        ));
        operations.push(Operation::new("g", vec![0.into()]));
        operations.extend(show_text(line.x, line.y, encode_win_ansi(&line.text)));
    }

    operations.push(Operation::new("ET", vec![]));
    operations
}

/// 渲染为 PDF 字节
pub fn render_pdf(pages: &[LaidOutPage], layout: &ReviewLayout) -> AppResult<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page, layout),
        };
        let encoded = content.encode().map_err(AppError::pdf)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), layout.page_width.into(), layout.page_height.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).map_err(AppError::pdf)?;
    Ok(buffer)
}
