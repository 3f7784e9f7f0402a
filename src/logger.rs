//! 日志初始化
//!
//! 使用 `tracing_subscriber`，日志级别由 `RUST_LOG` 控制

use tracing_subscriber::EnvFilter;

/// 初始化日志，`RUST_LOG` 未设置时使用给定的默认级别
///
/// 重复调用是安全的（测试中常见），第二次起直接忽略
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
