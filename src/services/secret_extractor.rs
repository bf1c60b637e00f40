//! 口令提取 - 业务能力层
//!
//! 按优先级依次尝试三条正则，命中即返回。第二条规则非常宽松，
//! 结果只作为低置信度的猜测，在调用 LLM 之前先试一次。

use std::sync::LazyLock;

use regex::Regex;

static SECRET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // tds{...}，含花括号
        Regex::new(r"(?i)(tds\{[^}]+\})").unwrap(),
        // 任意 6 位以上的独立词
        Regex::new(r"\b([A-Za-z0-9_\-]{6,})\b").unwrap(),
        // "secret" 之后的 4 位以上的词
        Regex::new(r"(?i)secret[:\s]*([A-Za-z0-9_\-{}]{4,})").unwrap(),
    ]
});

/// 从页面文本中提取口令
pub fn extract_secret(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    SECRET_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tds_token_wins() {
        let text = "Welcome participant, your codeword follows: tds{abc123}";
        assert_eq!(extract_secret(text).as_deref(), Some("tds{abc123}"));

        let upper = "anything TDS{Mixed_Case} here";
        assert_eq!(extract_secret(upper).as_deref(), Some("TDS{Mixed_Case}"));
    }

    #[test]
    fn test_long_token_fallback() {
        assert_eq!(extract_secret("the code is abc-12345 ok").as_deref(), Some("abc-12345"));
        // 宽松规则会命中普通单词
        assert_eq!(extract_secret("Please answer now").as_deref(), Some("Please"));
    }

    #[test]
    fn test_secret_keyword_rule() {
        // "secret" 前紧贴非 ASCII 字母时没有词边界，第二条规则不命中
        assert_eq!(extract_secret("éSecret: k9{z}").as_deref(), Some("k9{z}"));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(extract_secret(""), None);
        assert_eq!(extract_secret("What is 2 + 2 ?"), None);
    }
}
