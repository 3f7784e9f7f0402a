//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::workflow::WizardStep;

/// 创建（覆盖）日志文件并写入表头
///
/// # 参数
/// - `log_file_path`: 日志文件路径，父目录不存在时自动创建
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let path = Path::new(log_file_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let rule = "=".repeat(60);
    let started = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    fs::write(path, format!("{rule}\n稿件提交日志 - {started}\n{rule}\n\n"))?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `api_base_url`: 后端地址
pub fn log_startup(api_base_url: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 稿件提交向导");
    info!("🌐 后端地址: {}", api_base_url);
    info!("{}", "=".repeat(60));
}

/// 记录向导进入某一步
pub fn log_step(step: WizardStep) {
    info!("\n{}", "─".repeat(60));
    info!("📄 第 {}/7 步: {}", step.index(), step.title());
    info!("{}", "─".repeat(60));
}

/// 打印最终结果
///
/// # 参数
/// - `title`: 稿件标题
/// - `journal`: 投稿期刊
/// - `message`: 提交结果信息
pub fn log_outcome(title: &str, journal: &str, message: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 提交完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📝 标题: {}", truncate_text(title, 80));
    info!("📚 期刊: {}", journal);
    info!("✅ {}", message);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
