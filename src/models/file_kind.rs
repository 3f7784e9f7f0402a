//! 上传文件类型判断

use phf::phf_map;

/// 稿件正文唯一接受的格式
pub const MANUSCRIPT_EXTENSION: &str = "docx";

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

static MIME_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "docx" => DOCX_MIME,
    "doc" => "application/msword",
    "pdf" => "application/pdf",
    "txt" => "text/plain",
    "csv" => "text/csv",
    "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "xls" => "application/vnd.ms-excel",
    "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "tif" => "image/tiff",
    "tiff" => "image/tiff",
    "zip" => "application/zip",
};

/// 文件扩展名（小写）
pub fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// 根据文件名推断 MIME 类型，未知类型按二进制流处理
pub fn content_type_for(file_name: &str) -> &'static str {
    extension(file_name)
        .and_then(|ext| MIME_TYPES.get(ext.as_str()).copied())
        .unwrap_or("application/octet-stream")
}

/// 是否为可接受的稿件文件
pub fn is_manuscript(file_name: &str) -> bool {
    extension(file_name).as_deref() == Some(MANUSCRIPT_EXTENSION)
}
