use anyhow::Result;
use quiz_chain_solver::utils::logger;
use quiz_chain_solver::{server, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 读取 .env（可选）
    dotenvy::dotenv().ok();

    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::load()?;
    logger::log_startup(&config);

    // 启动服务
    server::serve(config).await?;

    Ok(())
}
