use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{AppResult, ConfigError};

/// 程序配置
///
/// 启动时构造一次，之后以引用形式传入编排层，核心逻辑不直接读取环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    /// 推理服务令牌
    pub aipipe_token: Option<String>,
    /// 推理服务完整地址（以 /chat/completions 结尾）
    pub aipipe_url: Option<String>,
    pub llm_model_name: String,
    pub llm_max_tokens: u32,
    // --- 评分接口配置 ---
    /// 答案提交地址
    pub submit_url: String,
    // --- 链式求解配置 ---
    /// 单次请求最多走多少步
    pub max_chain_steps: usize,
    /// 期望至少完成的步数
    pub required_min_steps: usize,
    /// 两步之间的固定间隔（毫秒）
    pub step_delay_ms: u64,
    /// 送入 LLM 的页面文本最大字符数
    pub page_text_limit: usize,
    pub http_timeout_secs: u64,
    pub llm_timeout_secs: u64,
    // --- 服务配置 ---
    /// 入站请求校验用的密钥
    pub quiz_secret: Option<String>,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aipipe_token: None,
            aipipe_url: None,
            llm_model_name: "openai/gpt-4.1-nano".to_string(),
            llm_max_tokens: 1000,
            submit_url: "https://tds-llm-analysis.s-anand.net/submit".to_string(),
            max_chain_steps: 10,
            required_min_steps: 3,
            step_delay_ms: 200,
            page_text_limit: 15_000,
            http_timeout_secs: 30,
            llm_timeout_secs: 60,
            quiz_secret: None,
            port: 8000,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（`QUIZ_CONFIG_FILE`，可选）→ 环境变量
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("QUIZ_CONFIG_FILE") {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 仅使用默认值 + 环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        parse_toml(&content, &path.display().to_string())
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        parse_toml(content, "<inline>")
    }

    fn with_env_overrides(self) -> Self {
        Self {
            aipipe_token: env_string("AIPIPE_TOKEN").or(self.aipipe_token),
            aipipe_url: env_string("AIPIPE_URL").or(self.aipipe_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_max_tokens: env_parsed("LLM_MAX_TOKENS").unwrap_or(self.llm_max_tokens),
            submit_url: env_string("ANALYSIS_SUBMIT_URL").unwrap_or(self.submit_url),
            max_chain_steps: env_parsed("MAX_CHAIN_STEPS").unwrap_or(self.max_chain_steps),
            required_min_steps: env_parsed("REQUIRED_MIN_STEPS").unwrap_or(self.required_min_steps),
            step_delay_ms: env_parsed("STEP_DELAY_MS").unwrap_or(self.step_delay_ms),
            page_text_limit: env_parsed("PAGE_TEXT_LIMIT").unwrap_or(self.page_text_limit),
            http_timeout_secs: env_parsed("HTTP_TIMEOUT_SECS").unwrap_or(self.http_timeout_secs),
            llm_timeout_secs: env_parsed("LLM_TIMEOUT_SECS").unwrap_or(self.llm_timeout_secs),
            quiz_secret: env_string("QUIZ_SECRET").or(self.quiz_secret),
            port: env_parsed("PORT").unwrap_or(self.port),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

fn parse_toml(content: &str, path: &str) -> AppResult<Config> {
    let config = toml::from_str(content).map_err(|e| ConfigError::TomlParseFailed {
        path: path.to_string(),
        source: e,
    })?;
    Ok(config)
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
