//! 答案归一化 - 业务能力层
//!
//! 评分接口只接受四种形态：布尔、数字、字符串、值均为标量的对象。
//! 任何候选答案都会被转换到其中之一，转换过程不会失败。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Number, Value};

static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+$").unwrap());
static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+\.\d+$").unwrap());

/// 把任意候选答案转换为评分接口接受的形态
pub fn normalize_answer(answer: &Value) -> Value {
    match answer {
        Value::Bool(_) | Value::Number(_) => answer.clone(),
        Value::Object(map) => flatten_answer_object(map),
        Value::String(s) => normalize_string(s),
        // 数组与 null 转为 JSON 文本
        Value::Array(_) | Value::Null => Value::String(answer.to_string()),
    }
}

fn normalize_string(raw: &str) -> Value {
    let s = raw.trim();

    if let Some(b) = parse_boolean(s) {
        return Value::Bool(b);
    }
    if INTEGER_RE.is_match(s) {
        // 超出 64 位整数范围时保留原文，避免转成有损的浮点
        return parse_integer(s).map_or_else(|| Value::String(s.to_string()), Value::Number);
    }
    if DECIMAL_RE.is_match(s) {
        if let Some(n) = s.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    if let Ok(parsed) = serde_json::from_str::<Value>(s) {
        match parsed {
            Value::Null => {}
            Value::Object(map) => return flatten_answer_object(&map),
            Value::Array(_) => return Value::String(parsed.to_string()),
            scalar => return scalar,
        }
    }
    // data:...;base64,... 以及其他文本都原样（去掉首尾空白）返回
    Value::String(s.to_string())
}

fn parse_boolean(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "y" => Some(true),
        "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_integer(s: &str) -> Option<Number> {
    s.parse::<i64>()
        .map(Number::from)
        .or_else(|_| s.parse::<u64>().map(Number::from))
        .ok()
}

/// 对象答案：有 `answer` 字段时只取该字段，否则把嵌套值压成字符串
fn flatten_answer_object(map: &Map<String, Value>) -> Value {
    if let Some(inner) = map.get("answer") {
        return match inner {
            Value::Bool(_) | Value::Number(_) | Value::String(_) => inner.clone(),
            other => Value::String(other.to_string()),
        };
    }

    let cleaned = map
        .iter()
        .map(|(k, v)| {
            let v = match v {
                Value::Bool(_) | Value::Number(_) | Value::String(_) => v.clone(),
                other => Value::String(other.to_string()),
            };
            (k.clone(), v)
        })
        .collect();
    Value::Object(cleaned)
}
