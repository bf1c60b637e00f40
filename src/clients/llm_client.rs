/// LLM API 客户端
///
/// 封装对 OpenAI 兼容推理端点的调用（aipipe 代理）
use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};

/// LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmClient {
    /// 创建新的 LLM 客户端，令牌或地址缺失时返回 `LlmError::NotConfigured`
    pub fn new(config: &Config) -> AppResult<Self> {
        let (token, endpoint) = match (&config.aipipe_token, &config.aipipe_url) {
            (Some(token), Some(endpoint)) => (token, endpoint),
            _ => return Err(LlmError::NotConfigured.into()),
        };

        let openai_config = OpenAIConfig::new()
            .with_api_key(token)
            .with_api_base(api_base_from_endpoint(endpoint));

        Ok(Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            max_tokens: config.llm_max_tokens,
            timeout: config.llm_timeout(),
        })
    }

    /// 覆盖输出 token 上限
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 发送聊天请求（temperature = 0）
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回第一个 choice 的文本内容
    pub async fn chat(&self, user_message: &str, system_message: Option<&str>) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| LlmError::RequestBuild(e.to_string()))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| LlmError::RequestBuild(e.to_string()))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.0)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| LlmError::RequestBuild(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| LlmError::Timeout {
                model: self.model_name.clone(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                AppError::llm_api_failed(&self.model_name, e)
            })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyResponse {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

/// 配置里给的是完整的 chat/completions 地址，客户端需要的是 API 根路径
fn api_base_from_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/chat/completions")
        .unwrap_or(trimmed)
        .to_string()
}
