pub mod llm_service;
pub mod normalizer;
pub mod page_fetcher;
pub mod secret_extractor;
pub mod spreadsheet;

pub use llm_service::LlmService;
pub use normalizer::normalize_answer;
pub use page_fetcher::{FetchedPage, PageFetcher};
pub use secret_extractor::extract_secret;
pub use spreadsheet::SpreadsheetService;
