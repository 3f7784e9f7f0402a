//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 初始化日志文件和后端客户端
//! - 对应命令行的各个子命令
//! - 唯一读写文件系统的模块
//!
//! ### `draft_runner` - 单份草稿处理
//! - 把 TOML 草稿填入向导
//! - 逐步翻页，遇到邮箱验证时询问验证码
//! - 生成预览（可选）并提交
//!
//! ## 层次关系
//!
//! ```text
//! app (命令分发)
//!     ↓
//! draft_runner (处理一份 LoadedDraft)
//!     ↓
//! workflow::Wizard (第 1..7 步)
//!     ↓
//! services (verification / metadata / review_copy)
//!     ↓
//! clients (SubmissionApi)
//! ```

pub mod app;
pub mod draft_runner;

pub use app::{number_lines_file, App};
pub use draft_runner::{
    apply_draft, drive_to_review, process_draft, CodePrompt, DraftOutcome, StdinPrompt,
};
