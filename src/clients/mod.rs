pub mod grader_client;
pub mod llm_client;

pub use grader_client::{GraderClient, SubmitOutcome};
pub use llm_client::LlmClient;
