//! 单步作答流程 - 流程层
//!
//! 核心职责：决定"这一页"用哪种方式得出答案
//!
//! 流程顺序：
//! 1. 页面有表格链接 → 表格启发式（失败只记录，不中断）
//! 2. 正则提取口令
//! 3. LLM 兜底

use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::{Method, StepRecord};
use crate::services::{extract_secret, FetchedPage, LlmService, SpreadsheetService};
use crate::utils::truncate_text;
use crate::workflow::step_ctx::StepCtx;

/// 单步作答流程
///
/// - 只负责挑选解题方式
/// - 不抓取页面，不提交答案
/// - 把所用方式、表格错误写进当前步骤记录
pub struct AnswerFlow {
    spreadsheet: SpreadsheetService,
    llm_service: LlmService,
}

impl AnswerFlow {
    pub fn new(spreadsheet: SpreadsheetService, llm_service: LlmService) -> Self {
        Self {
            spreadsheet,
            llm_service,
        }
    }

    /// 依次尝试 表格 → 口令 → LLM，返回未归一化的候选答案
    ///
    /// 只有 LLM 调用失败会返回错误，此时 `record.method` 已是 `Aipipe`
    pub async fn run(
        &self,
        ctx: &StepCtx,
        page: &FetchedPage,
        record: &mut StepRecord,
    ) -> AppResult<Value> {
        // ========== 方式 1: 表格启发式 ==========
        if let Some(file_link) = &page.file_link {
            info!("{} 📄 发现表格文件，尝试启发式处理", ctx);
            record.method = Some(Method::FileHeuristic);

            match self.spreadsheet.solve(file_link, &page.text).await {
                Ok(answer) => {
                    info!("{} ✓ 表格启发式得到答案", ctx);
                    return Ok(answer);
                }
                Err(e) => {
                    warn!("{} ⚠️ 表格处理失败，继续尝试其他方式: {}", ctx, e);
                    record.file_error = Some(e.to_string());
                }
            }
        }

        // ========== 方式 2: 正则提取口令 ==========
        if let Some(secret) = extract_secret(&page.text) {
            info!("{} 🔑 提取到口令: {}", ctx, truncate_text(&secret, 40));
            record.method = Some(Method::ExtractedSecret);
            return Ok(Value::String(secret));
        }

        // ========== 方式 3: LLM ==========
        info!("{} 🤖 使用 LLM 解题...", ctx);
        record.method = Some(Method::Aipipe);
        self.llm_service.solve_page(&ctx.url, &page.text).await
    }
}
