//! Shared fixtures for module tests: a scripted chat model, requirement
//! documents, and wiremock helpers for the chat-completion API.

use crate::document::WordDocument;
use crate::error::{Result, TestgenError};
use crate::llm::{ChatMessage, ChatModel, Completion};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Request path of the chat-completion endpoint under the mock base URL.
pub(crate) const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Scripted `ChatModel` that replays canned replies and records prompts.
pub(crate) struct FakeModel {
    replies: Mutex<Vec<Result<String>>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeModel {
    pub(crate) fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scripted(replies.into_iter().map(|r| Ok(r.into())).collect())
    }

    pub(crate) fn scripted(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ChatModel for FakeModel {
    fn complete(&self, messages: &[ChatMessage]) -> Result<Completion> {
        self.calls.lock().unwrap().push(messages.to_vec());

        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(TestgenError::Llm("fake model has no replies left".to_string()));
        }
        let text = replies.remove(0)?;

        Ok(Completion {
            text,
            model: Some("fake".to_string()),
            prompt_tokens: None,
            completion_tokens: None,
        })
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

/// Write a requirements `.docx` with one paragraph per entry.
pub(crate) fn write_requirements_docx(dir: &Path, paragraphs: &[&str]) -> PathBuf {
    let mut doc = WordDocument::new();
    for paragraph in paragraphs {
        doc.add_paragraph(*paragraph);
    }
    let path = dir.join("requirements.docx");
    doc.save(&path).unwrap();
    path
}

/// A `/chat/completions` success body carrying `text`.
pub(crate) fn completion_body(text: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-mock",
        "model": "gpt-test-0001",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

/// Base URL pointing an `OpenAiChat` at `server`.
pub(crate) fn api_base_url(server: &MockServer) -> String {
    format!("{}/v1", server.uri())
}

/// Answer the next `replies.len()` completion requests in order, one reply
/// each. Every mock expects exactly one call, checked when `server` drops.
pub(crate) async fn mount_completions(server: &MockServer, replies: &[&str]) {
    for reply in replies {
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(reply)))
            .up_to_n_times(1)
            .expect(1)
            .mount(server)
            .await;
    }
}

/// Bodies of every request `server` received, in arrival order.
pub(crate) async fn received_bodies(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| String::from_utf8_lossy(&request.body).into_owned())
        .collect()
}
