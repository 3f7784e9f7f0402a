//! # Manuscript Submit
//!
//! 学术期刊稿件投稿向导（无界面版本）
//!
//! ## 架构设计
//!
//! ### ① 基础设施层
//! - `config` / `error` / `logger` / `utils::logging`
//!
//! ### ② 模型层（Models）
//! - `models/` - 草稿、期刊列表、投稿须知、ORCID 格式化、TOML 草稿加载
//!
//! ### ③ 客户端层（Clients）
//! - `clients/` - `SubmissionApi`：投稿后端 `/submissions/*` 接口
//!
//! ### ④ 业务能力层（Services）
//! - `verification` - 邮箱验证子流程
//! - `metadata` - 元数据自动提取（一次性触发 + 提取方式）
//! - `review_copy` - 带行号的审稿版（本地排版 / 远程转换）
//!
//! ### ⑤ 流程层（Workflow）
//! - `Wizard` - 7 步投稿向导状态机
//!
//! ### ⑥ 编排层（Orchestration）
//! - `App` - 命令行各子命令的入口
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{SubmissionApi, SubmissionClient, SubmissionPayload};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{SubmissionDraft, UploadedFile};
pub use orchestrator::App;
pub use workflow::{Advance, SubmitResult, Wizard, WizardState, WizardStep};
