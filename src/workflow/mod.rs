pub mod answer_flow;
pub mod step_ctx;

pub use answer_flow::AnswerFlow;
pub use step_ctx::StepCtx;
