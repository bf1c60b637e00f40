use thiserror::Error;

/// 应用程序错误类型
///
/// 步骤日志里只保存 `to_string()` 后的文本，变体用于区分"可降级"与"终止整条链"
#[derive(Debug, Error)]
pub enum AppError {
    /// 页面或文件抓取错误
    #[error("抓取错误: {0}")]
    Fetch(#[from] FetchError),
    /// 表格文件处理错误（可降级到下一种解题方式）
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 答案提交错误
    #[error("提交错误: {0}")]
    Submission(#[from] SubmissionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 抓取错误（非 2xx 或网络失败）
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("请求 {url} 失败: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("请求 {url} 返回状态码 {status}")]
    BadStatus { url: String, status: u16 },
}

/// 表格文件错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 扩展名不是 csv / xls / xlsx
    #[error("不支持的文件类型: {url}")]
    UnsupportedType { url: String },
    /// 内容无法解析为表格
    #[error("表格解析失败 ({url}): {reason}")]
    ParseFailed { url: String, reason: String },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 缺少令牌或推理地址
    #[error("AIPIPE_TOKEN 或 AIPIPE_URL 未设置")]
    NotConfigured,
    /// 构建请求失败
    #[error("构建 LLM 请求失败: {0}")]
    RequestBuild(String),
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {reason}")]
    ApiCallFailed { model: String, reason: String },
    /// 调用超时
    #[error("LLM API调用超时 (模型: {model}, {secs}秒)")]
    Timeout { model: String, secs: u64 },
    /// 返回结果为空
    #[error("LLM返回结果为空 (模型: {model})")]
    EmptyResponse { model: String },
}

/// 提交错误（仅网络失败，响应解析失败不算错误）
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("提交到 {endpoint} 失败: {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path} 失败: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建抓取请求失败错误
    pub fn fetch_failed(url: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Fetch(FetchError::RequestFailed {
            url: url.into(),
            source,
        })
    }

    /// 创建表格解析错误
    pub fn file_parse_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        AppError::File(FileError::ParseFailed {
            url: url.into(),
            reason: reason.to_string(),
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(model: impl Into<String>, reason: impl ToString) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            reason: reason.to_string(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
