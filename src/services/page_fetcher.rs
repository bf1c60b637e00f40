//! 页面抓取 - 业务能力层
//!
//! 只负责"拿到一页题目"：正文文本 + 页面里第一个表格文件链接

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::HttpClient;

/// 支持的表格文件扩展名
pub const TABLE_EXTENSIONS: [&str; 3] = [".csv", ".xls", ".xlsx"];

/// 正文里不可见的标签
const HIDDEN_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*").unwrap());
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("合法的选择器"));

/// 抓取到的页面
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    /// 去掉标签后的正文
    pub text: String,
    /// 第一个表格文件的绝对地址
    pub file_link: Option<String>,
}

/// 页面抓取服务
pub struct PageFetcher {
    http: HttpClient,
}

impl PageFetcher {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// 抓取页面，正文与链接扫描复用同一份响应
    pub async fn fetch(&self, url: &str) -> AppResult<FetchedPage> {
        let html = self.http.get_text(url).await?;
        let document = Html::parse_document(&html);

        let text = extract_text(&document);
        let file_link = find_file_link(&document, url);

        debug!(
            "页面 {} 正文长度 {} 字符，表格链接: {:?}",
            url,
            text.chars().count(),
            file_link
        );

        Ok(FetchedPage {
            url: url.to_string(),
            text,
            file_link,
        })
    }
}

/// 提取可见文本，连续空行压成一个空行
pub fn extract_text(document: &Html) -> String {
    let pieces: Vec<&str> = document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map_or(false, |el| HIDDEN_TAGS.contains(&el.name()))
            });
            (!hidden).then_some(&**text)
        })
        .collect();

    BLANK_LINES_RE
        .replace_all(&pieces.join("\n"), "\n\n")
        .trim()
        .to_string()
}

/// 按文档顺序找第一个表格文件链接，相对地址基于页面地址补全
pub fn find_file_link(document: &Html, page_url: &str) -> Option<String> {
    let href = document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .find(|href| has_table_extension(href))?;

    if href.starts_with("http") {
        return Some(href.to_string());
    }

    Url::parse(page_url)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .ok()
}

/// 判断地址是否以表格扩展名结尾（大小写不敏感）
pub fn has_table_extension(url: &str) -> bool {
    let lower = url.to_lowercase();
    TABLE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
