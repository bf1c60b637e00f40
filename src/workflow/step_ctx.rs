//! 步骤上下文
//!
//! 封装"我正在处理链上第几步、哪个地址"这一信息

use std::fmt::Display;

/// 步骤上下文
#[derive(Debug, Clone)]
pub struct StepCtx {
    /// 步骤编号（从1开始）
    pub step_index: usize,

    /// 当前题目地址
    pub url: String,
}

impl StepCtx {
    pub fn new(step_index: usize, url: impl Into<String>) -> Self {
        Self {
            step_index,
            url: url.into(),
        }
    }
}

impl Display for StepCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[步骤 {}]", self.step_index)
    }
}
