pub mod logger;

pub use logger::truncate_text;
