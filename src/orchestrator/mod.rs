//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 驱动整条题目链：循环调度下层能力，累积步骤记录，生成最终结果。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::ChainSolver (处理整条链)
//!     ↓
//! workflow::AnswerFlow (处理单页作答)
//!     ↓
//! services / clients (能力层：抓取 / 表格 / 口令 / LLM / 提交)
//!     ↓
//! infrastructure (基础设施：HttpClient)
//! ```
//!
//! ## 设计原则
//!
//! 1. **顺序执行**：上一步提交完成才知道下一题地址
//! 2. **资源隔离**：每条链独占自己的 HttpClient
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure

pub mod chain_solver;

pub use chain_solver::{extract_next_url, ChainSolver};
