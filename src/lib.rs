pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
