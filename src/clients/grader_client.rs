/// 评分接口客户端
///
/// 归一化答案后提交，返回状态码与解析后的响应
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{AppResult, SubmissionError};
use crate::infrastructure::HttpClient;
use crate::services::normalizer::normalize_answer;

/// 一次提交的结果
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub status_code: u16,
    /// 响应 JSON；无法解析时为 `{"raw": 原文}`
    pub parsed: Value,
    pub raw_text: String,
    /// 实际发送出去的（归一化后的）答案
    pub submitted_answer: Value,
}

/// 评分接口客户端
pub struct GraderClient {
    http: HttpClient,
    submit_url: String,
}

impl GraderClient {
    pub fn new(http: HttpClient, submit_url: impl Into<String>) -> Self {
        Self {
            http,
            submit_url: submit_url.into(),
        }
    }

    /// 提交答案
    ///
    /// # 参数
    /// - `email` / `secret`: 身份信息
    /// - `url`: 当前题目地址
    /// - `answer`: 未归一化的候选答案
    pub async fn submit(
        &self,
        email: &str,
        secret: &str,
        url: &str,
        answer: &Value,
    ) -> AppResult<SubmitOutcome> {
        let submitted_answer = normalize_answer(answer);
        let payload = json!({
            "email": email,
            "secret": secret,
            "url": url,
            "answer": submitted_answer,
        });

        debug!("提交 Payload: {}", payload);

        let response = self
            .http
            .inner()
            .post(&self.submit_url)
            .timeout(self.http.timeout())
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.request_failed(e))?;

        let status_code = response.status().as_u16();
        let raw_text = response.text().await.map_err(|e| self.request_failed(e))?;
        let parsed = serde_json::from_str(&raw_text).unwrap_or_else(|_| json!({ "raw": raw_text }));

        debug!("提交结果 ({}): {}", status_code, raw_text);

        Ok(SubmitOutcome {
            status_code,
            parsed,
            raw_text,
            submitted_answer,
        })
    }

    fn request_failed(&self, source: reqwest::Error) -> SubmissionError {
        SubmissionError::RequestFailed {
            endpoint: self.submit_url.clone(),
            source,
        }
    }
}
