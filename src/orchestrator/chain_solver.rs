//! 链式求解器 - 编排层
//!
//! ## 职责
//!
//! 从起始地址出发，一页一页地作答并提交，跟随评分接口返回的下一题地址，
//! 直到没有下一题、出错或达到步数上限。
//!
//! ## 状态
//!
//! ```text
//! RUNNING ──无下一题──▶ STOPPED(no_next_url)
//!    │ ────达到上限──▶ STOPPED(max_steps_reached)
//!    └─────出错──────▶ STOPPED(error)
//! ```
//!
//! 每一步都会留下一条记录，出错的那一步同样记录后立即结束，不重试。

use serde_json::Value;
use tracing::{error, info};

use crate::clients::GraderClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::HttpClient;
use crate::models::{ChainRequest, ChainResult, StepRecord, StopReason};
use crate::services::{LlmService, PageFetcher, SpreadsheetService};
use crate::utils::logger::{log_chain_summary, truncate_text};
use crate::workflow::{AnswerFlow, StepCtx};

/// 链式求解器
///
/// 每次请求创建一个，持有本条链独占的 HTTP 客户端
pub struct ChainSolver {
    page_fetcher: PageFetcher,
    answer_flow: AnswerFlow,
    grader: GraderClient,
    step_delay: std::time::Duration,
}

impl ChainSolver {
    pub fn new(config: &Config) -> Self {
        let http = HttpClient::new(config.http_timeout());

        Self {
            page_fetcher: PageFetcher::new(http.clone()),
            answer_flow: AnswerFlow::new(
                SpreadsheetService::new(http.clone()),
                LlmService::new(config),
            ),
            grader: GraderClient::new(http, config.submit_url.clone()),
            step_delay: config.step_delay(),
        }
    }

    /// 求解整条链
    pub async fn solve(&self, request: &ChainRequest) -> ChainResult {
        info!(
            "🔗 开始链式求解: {} (最多 {} 步, 至少 {} 步)",
            request.start_url, request.max_steps, request.required_min_steps
        );

        let mut steps: Vec<StepRecord> = Vec::new();
        let mut current_url = Some(request.start_url.clone()).filter(|url| !url.is_empty());

        let stop_reason = loop {
            let Some(url) = current_url.take() else {
                break StopReason::NoNextUrl;
            };
            if steps.len() >= request.max_steps {
                info!("⏹️ 达到最大步数 {}，停止", request.max_steps);
                break StopReason::MaxStepsReached;
            }

            let ctx = StepCtx::new(steps.len() + 1, url);
            let mut record = StepRecord::new(ctx.step_index, ctx.url.clone());
            log_step_start(&ctx);

            match self.run_step(&ctx, request, &mut record).await {
                Ok(Some(next_url)) => {
                    info!("{} ➡️ 下一题: {}", ctx, next_url);
                    steps.push(record);
                    current_url = Some(next_url);
                    if steps.len() < request.max_steps {
                        tokio::time::sleep(self.step_delay).await;
                    }
                }
                Ok(None) => {
                    info!("{} 🏁 没有下一题，链结束", ctx);
                    steps.push(record);
                    break StopReason::NoNextUrl;
                }
                Err(e) => {
                    error!("{} ❌ 处理失败，终止整条链: {}", ctx, e);
                    record.error = Some(e.to_string());
                    steps.push(record);
                    break StopReason::Error;
                }
            }
        };

        let result = ChainResult::from_steps(steps, request.required_min_steps, stop_reason);
        log_chain_summary(&result);
        result
    }

    /// 处理一步：抓取 → 作答 → 提交 → 解析下一题地址
    async fn run_step(
        &self,
        ctx: &StepCtx,
        request: &ChainRequest,
        record: &mut StepRecord,
    ) -> AppResult<Option<String>> {
        let page = self.page_fetcher.fetch(&ctx.url).await?;
        info!("{} 题面: {}", ctx, truncate_text(&page.text, 80));

        let answer = self.answer_flow.run(ctx, &page, record).await?;
        record.raw_answer = Some(answer.clone());

        info!("{} 📤 正在提交答案...", ctx);
        let outcome = self
            .grader
            .submit(&request.email, &request.secret, &ctx.url, &answer)
            .await?;

        info!(
            "{} 提交状态 {}，实际答案: {}",
            ctx,
            outcome.status_code,
            truncate_text(&outcome.submitted_answer.to_string(), 80)
        );

        let next_url = extract_next_url(&outcome.parsed);

        record.submit_status = Some(outcome.status_code);
        record.submitted_answer = Some(outcome.submitted_answer);
        record.submit_parsed = Some(outcome.parsed);
        record.next_url = next_url.clone();

        Ok(next_url)
    }
}

/// 从评分响应里取下一题地址
///
/// `url` 有时被二次编码成 JSON 字符串，此时再解析一层取里面的 `url`
pub fn extract_next_url(parsed: &Value) -> Option<String> {
    let url = parsed.get("url")?.as_str()?;

    if url.starts_with('{') {
        if let Ok(Value::Object(nested)) = serde_json::from_str::<Value>(url) {
            return nested
                .get("url")
                .and_then(Value::as_str)
                .filter(|u| !u.is_empty())
                .map(str::to_string);
        }
    }

    Some(url.to_string()).filter(|u| !u.is_empty())
}

fn log_step_start(ctx: &StepCtx) {
    info!("\n{} {}", ctx, "─".repeat(30));
    info!("{} 🔍 正在处理: {}", ctx, ctx.url);
}
