//! HTTP 入口
//!
//! `POST /quiz` 校验请求后同步跑完整条链，返回 `ChainResult`

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::ChainRequest;
use crate::orchestrator::ChainSolver;

/// 构建路由
pub fn router(config: Config) -> Router {
    Router::new()
        .route("/quiz", post(quiz_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(config))
}

/// 启动服务并阻塞直到退出
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 服务监听: http://{}", addr);

    axum::serve(listener, router(config)).await?;
    Ok(())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// 字段是否"有值"：null、false、0、空字符串与空容器都算缺失
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn required_field<'a>(data: &'a Value, name: &str) -> Option<&'a Value> {
    data.get(name).filter(|v| is_present(v))
}

/// 字符串原样取出，其他类型取 JSON 文本
fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 请求体不看 Content-Type，直接按 JSON 解析
async fn quiz_handler(State(config): State<Arc<Config>>, body: Bytes) -> Response {
    let Some(expected_secret) = config.quiz_secret.as_deref() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server misconfigured: QUIZ_SECRET not set",
        );
    };

    let Ok(data) = serde_json::from_slice::<Value>(&body) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid JSON payload");
    };

    let Some(email) = required_field(&data, "email") else {
        return error_response(StatusCode::BAD_REQUEST, "Email missing");
    };
    let Some(secret) = required_field(&data, "secret") else {
        return error_response(StatusCode::BAD_REQUEST, "Secret missing");
    };
    let Some(url) = required_field(&data, "url") else {
        return error_response(StatusCode::BAD_REQUEST, "URL missing");
    };

    let email = field_text(email);
    if secret.as_str() != Some(expected_secret) {
        warn!("⚠️ 拒绝请求: 密钥不匹配 ({})", email);
        return error_response(StatusCode::FORBIDDEN, "Invalid secret");
    }

    let request = ChainRequest {
        email,
        secret: expected_secret.to_string(),
        start_url: field_text(url),
        required_min_steps: config.required_min_steps,
        max_steps: config.max_chain_steps,
    };

    let result = ChainSolver::new(&config).solve(&request).await;
    (StatusCode::OK, Json(result)).into_response()
}
