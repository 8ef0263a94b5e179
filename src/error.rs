//! Error types for the testgen CLI.
//!
//! Uses thiserror for derive macros. Variants keep the failing stage apart
//! for messages and tests, but every one of them collapses to the same exit
//! code and JSON error line at the process boundary.

use crate::exit_codes;
use serde_json::json;
use thiserror::Error;

/// Main error type for testgen operations.
#[derive(Error, Debug)]
pub enum TestgenError {
    /// Wrong number of command-line arguments.
    #[error("{0}")]
    Usage(String),

    /// Missing or invalid settings (environment, crew file).
    #[error("configuration error: {0}")]
    Config(String),

    /// The input document could not be opened or parsed.
    #[error("document error: {0}")]
    Document(String),

    /// A prompt template could not be rendered.
    #[error("template error: {0}")]
    Template(String),

    /// The crew definition or its execution is inconsistent.
    #[error("crew error: {0}")]
    Crew(String),

    /// The chat-completion API call failed.
    #[error("LLM request failed: {0}")]
    Llm(String),

    /// Reading or writing an artifact failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl TestgenError {
    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        exit_codes::FAILURE
    }

    /// Render the error as the single-line JSON object written to stderr.
    pub fn to_json_line(&self) -> String {
        json!({ "error": self.to_string() }).to_string()
    }
}

/// Result type alias for testgen operations.
pub type Result<T> = std::result::Result<T, TestgenError>;
