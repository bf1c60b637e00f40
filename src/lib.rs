//! # Quiz Chain Solver
//!
//! 接收一个题目链的起始地址，逐页作答并提交，跟随评分接口返回的下一题地址
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有每条链独占的 HTTP 客户端
//!
//! ### ② 业务能力层（Clients / Services）
//! - `clients/` - 外部接口：`LlmClient`（推理端点）、`GraderClient`（评分接口）
//! - `services/` - 单页能力：页面抓取、表格启发式、口令提取、LLM 解题、答案归一化
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一页"的作答流程（表格 → 口令 → LLM）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 整条链的循环、步骤记录与最终结果
//!
//! ### 入口
//! - `server` - `POST /quiz`

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod server;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ChainOutcome, ChainRequest, ChainResult, Method, StepRecord, StopReason};
pub use orchestrator::ChainSolver;
pub use services::normalize_answer;
