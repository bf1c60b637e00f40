//! HTTP 客户端 - 基础设施层
//!
//! 每条链持有自己的 `reqwest::Client`，只暴露"GET 并检查状态码"的能力

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::debug;

use crate::error::{AppError, AppResult, FetchError};

/// HTTP 客户端
///
/// 职责：
/// - 持有链内共享的连接池
/// - 统一超时
/// - 非 2xx 一律转为 `FetchError`
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// 获取内部 client 的引用（用于 POST 等其他请求）
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET 请求，状态码非 2xx 时返回错误
    pub async fn get(&self, url: &str) -> AppResult<Response> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::fetch_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        Ok(response)
    }

    /// GET 并读取文本
    pub async fn get_text(&self, url: &str) -> AppResult<String> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| AppError::fetch_failed(url, e))
    }

    /// GET 并读取原始字节
    pub async fn get_bytes(&self, url: &str) -> AppResult<Vec<u8>> {
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| AppError::fetch_failed(url, e))?;
        Ok(bytes.to_vec())
    }
}
