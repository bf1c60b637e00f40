//! LLM 解题 - 业务能力层
//!
//! 把页面正文交给 LLM，要求返回 `{"answer", "explanation"}` 形式的 JSON，
//! 然后尽力解析。调用方不假定返回形态：可能是对象、标量，也可能是原始文本。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::clients::LlmClient;
use crate::config::Config;
use crate::error::{AppResult, LlmError};
use crate::utils::logger::truncate_text;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that outputs a JSON with 'answer' and 'explanation'.";

static JSON_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\{[\s\S]*\})").unwrap());

/// LLM 解题服务
///
/// 职责：
/// - 构建提示词
/// - 调用 LLM
/// - 解析回复
/// - 不关心链路与提交
pub struct LlmService {
    client: Option<LlmClient>,
    page_text_limit: usize,
}

impl LlmService {
    /// 创建 LLM 服务；未配置令牌时仍可创建，调用时才报错
    pub fn new(config: &Config) -> Self {
        let client = match LlmClient::new(config) {
            Ok(client) => Some(client),
            Err(e) => {
                debug!("LLM 客户端不可用: {}", e);
                None
            }
        };

        Self {
            client,
            page_text_limit: config.page_text_limit,
        }
    }

    /// 让 LLM 解答一页题目
    pub async fn solve_page(&self, page_url: &str, page_text: &str) -> AppResult<Value> {
        let client = self.client.as_ref().ok_or(LlmError::NotConfigured)?;

        let user_prompt = build_user_prompt(page_url, page_text, self.page_text_limit);
        let reply = client.chat(&user_prompt, Some(SYSTEM_PROMPT)).await?;

        debug!("LLM 回复: {}", truncate_text(&reply, 200));

        Ok(parse_llm_reply(&reply))
    }
}

/// 构建用户提示词，正文截断到前 `limit` 个字符
fn build_user_prompt(page_url: &str, page_text: &str, limit: usize) -> String {
    let truncated: String = page_text.chars().take(limit).collect();
    format!(
        r#"
URL: {}

Page content:
{}

Return ONLY JSON:
{{
  "answer": "<value>",
  "explanation": "<short reasoning>"
}}
"#,
        page_url, truncated
    )
}

/// 解析 LLM 回复：整体 JSON → 第一个花括号片段 → 原始文本
pub fn parse_llm_reply(reply: &str) -> Value {
    let reply = reply.trim();

    if let Ok(value) = serde_json::from_str::<Value>(reply) {
        return value;
    }

    if let Some(caps) = JSON_OBJECT_RE.captures(reply) {
        if let Ok(value) = serde_json::from_str::<Value>(&caps[1]) {
            return value;
        }
    }

    warn!("LLM 回复不是 JSON，按原始文本处理");
    Value::String(reply.to_string())
}
