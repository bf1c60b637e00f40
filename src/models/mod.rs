pub mod chain;

pub use chain::{ChainOutcome, ChainRequest, ChainResult, Method, StepRecord, StopReason};
