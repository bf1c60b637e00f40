use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 一次链式求解请求，求解过程中不变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainRequest {
    pub email: String,
    pub secret: String,
    pub start_url: String,
    pub required_min_steps: usize,
    pub max_steps: usize,
}

/// 本步答案的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// 表格启发式
    FileHeuristic,
    /// 正则提取的口令
    ExtractedSecret,
    /// LLM 作答
    Aipipe,
}

/// 单步记录，追加后不再修改
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepRecord {
    /// 步骤编号（从1开始）
    pub step: usize,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
    /// 表格处理失败的原因（失败后继续尝试其他方式）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_error: Option<String>,
    /// 归一化之前的候选答案
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_answer: Option<Value>,
    /// 实际发送给评分接口的答案
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_answer: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_parsed: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepRecord {
    pub fn new(step: usize, url: impl Into<String>) -> Self {
        Self {
            step,
            url: url.into(),
            ..Default::default()
        }
    }

    /// 提交状态码低于 400 才算成功；没有提交过的步骤视为失败
    pub fn submitted_ok(&self) -> bool {
        self.submit_status.map_or(false, |status| status < 400)
    }
}

/// 链结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    NoNextUrl,
    MaxStepsReached,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainOutcome {
    ChainCompleted,
    ChainWithErrors,
}

/// 链式求解的最终结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainResult {
    pub result: ChainOutcome,
    pub steps_done: usize,
    pub meets_required_steps: bool,
    pub stop_reason: StopReason,
    pub steps: Vec<StepRecord>,
}

impl ChainResult {
    /// 循环退出时根据步骤记录汇总
    pub fn from_steps(
        steps: Vec<StepRecord>,
        required_min_steps: usize,
        stop_reason: StopReason,
    ) -> Self {
        let steps_done = steps.len();
        let result = if steps.iter().all(StepRecord::submitted_ok) {
            ChainOutcome::ChainCompleted
        } else {
            ChainOutcome::ChainWithErrors
        };

        Self {
            result,
            steps_done,
            meets_required_steps: steps_done >= required_min_steps,
            stop_reason,
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submitted(step: usize, status: u16) -> StepRecord {
        StepRecord {
            submit_status: Some(status),
            ..StepRecord::new(step, format!("https://quiz/{}", step))
        }
    }

    #[test]
    fn test_outcome_uses_status_codes() {
        let ok = ChainResult::from_steps(
            vec![submitted(1, 200), submitted(2, 399)],
            2,
            StopReason::NoNextUrl,
        );
        assert_eq!(ok.result, ChainOutcome::ChainCompleted);
        assert!(ok.meets_required_steps);

        let bad = ChainResult::from_steps(
            vec![submitted(1, 200), submitted(2, 400)],
            3,
            StopReason::NoNextUrl,
        );
        assert_eq!(bad.result, ChainOutcome::ChainWithErrors);
        assert!(!bad.meets_required_steps);
    }

    #[test]
    fn test_step_without_submission_counts_as_failure() {
        let mut failed = StepRecord::new(1, "https://quiz/1");
        failed.error = Some("boom".to_string());

        let result = ChainResult::from_steps(vec![failed], 1, StopReason::Error);
        assert_eq!(result.result, ChainOutcome::ChainWithErrors);
        assert_eq!(result.steps_done, 1);
    }

    #[test]
    fn test_empty_chain_is_completed() {
        let result = ChainResult::from_steps(Vec::new(), 0, StopReason::MaxStepsReached);
        assert_eq!(result.result, ChainOutcome::ChainCompleted);
        assert!(result.meets_required_steps);
    }

    #[test]
    fn test_serialized_shape() {
        let mut record = submitted(1, 200);
        record.method = Some(Method::ExtractedSecret);
        let result = ChainResult::from_steps(vec![record], 3, StopReason::NoNextUrl);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["result"], json!("chain_completed"));
        assert_eq!(value["stop_reason"], json!("no_next_url"));
        assert_eq!(value["steps"][0]["method"], json!("extracted_secret"));
        assert!(value["steps"][0].get("error").is_none());
    }
}
