//! Configuration and the language-model adapter for the `cohort` server.

pub mod config;
pub mod llm;

pub use config::ServerConfig;
pub use llm::ChatCompletions;
