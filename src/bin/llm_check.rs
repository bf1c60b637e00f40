//! LLM 连通性检查
//!
//! 运行方式：
//! ```bash
//! cargo run --bin llm_check
//! ```

use anyhow::Result;
use quiz_chain_solver::clients::LlmClient;
use quiz_chain_solver::utils::logger;
use quiz_chain_solver::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init();

    let config = Config::load()?;
    let client = LlmClient::new(&config)?.with_max_tokens(500);

    println!("模型: {}", client.model_name());

    match client
        .chat("Please answer succinctly.", Some("You are a helpful assistant."))
        .await
    {
        Ok(reply) => {
            println!("status: ok");
            println!("response: {}", reply);
        }
        Err(e) => {
            println!("status: error");
            println!("response: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
