/// 日志工具模块
///
/// 初始化 tracing 以及格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::ChainResult;

/// 初始化日志，默认级别 info，可用 RUST_LOG 覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 服务启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📡 监听端口: {}", config.port);
    info!("📤 提交地址: {}", config.submit_url);
    info!("🔁 最大步数: {}", config.max_chain_steps);
    info!(
        "🤖 LLM: {} ({})",
        config.llm_model_name,
        if config.aipipe_token.is_some() && config.aipipe_url.is_some() {
            "已配置"
        } else {
            "未配置"
        }
    );
    info!("{}", "=".repeat(60));
}

/// 打印链式求解的最终统计
pub fn log_chain_summary(result: &ChainResult) {
    info!("\n{}", "─".repeat(60));
    info!("📊 链式求解完成: {:?}", result.result);
    info!(
        "步数: {} | 达到要求步数: {} | 结束原因: {:?}",
        result.steps_done, result.meets_required_steps, result.stop_reason
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
