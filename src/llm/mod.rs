//! Chat-completion client subsystem.
//!
//! - **ChatModel**: the seam the crew talks to; one blocking call per task
//! - **OpenAiChat**: `ChatModel` over an OpenAI-compatible HTTP API
//!
//! Agents share one `Arc<dyn ChatModel>` handle for the whole run.

mod openai;

use crate::error::Result;
use serde::{Deserialize, Serialize};

pub use openai::{OpenAiChat, parse_completion};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One message of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Text returned by the model plus usage accounting when the API reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub model: Option<String>,
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
}

/// A blocking chat-completion backend.
pub trait ChatModel: Send + Sync {
    /// Send the conversation and return the assistant's reply.
    fn complete(&self, messages: &[ChatMessage]) -> Result<Completion>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}
