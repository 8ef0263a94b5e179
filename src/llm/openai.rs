//! OpenAI-compatible `/chat/completions` client.

use super::{ChatMessage, ChatModel, Completion};
use crate::config::Settings;
use crate::error::{Result, TestgenError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Blocking HTTP client for an OpenAI-compatible chat API.
pub struct OpenAiChat {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens: Option<u64>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl OpenAiChat {
    /// Build a client from resolved settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| TestgenError::Llm(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: settings.chat_completions_url(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }
}

impl ChatModel for OpenAiChat {
    fn complete(&self, messages: &[ChatMessage]) -> Result<Completion> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| TestgenError::Llm(format!("failed to call {}: {}", self.url, e)))?;

        let status = response.status().as_u16();
        let payload = response
            .text()
            .map_err(|e| TestgenError::Llm(format!("failed to read response body: {}", e)))?;

        parse_completion(status, &payload)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Interpret an HTTP status and body from `/chat/completions`.
///
/// Non-2xx responses surface the API's own error message when the body
/// carries one. A 2xx response must contain non-blank assistant content in
/// its first choice.
pub fn parse_completion(status: u16, body: &str) -> Result<Completion> {
    if !(200..300).contains(&status) {
        let detail = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => match envelope.error.kind {
                Some(kind) => format!("{} ({})", envelope.error.message, kind),
                None => envelope.error.message,
            },
            Err(_) => body.trim().to_string(),
        };
        return Err(TestgenError::Llm(format!("status {}: {}", status, detail)));
    }

    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| TestgenError::Llm(format!("invalid response payload: {}", e)))?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| {
            TestgenError::Llm("response did not include assistant content".to_string())
        })?;

    Ok(Completion {
        text,
        model: parsed.model,
        prompt_tokens: parsed.usage.as_ref().and_then(|u| u.prompt_tokens),
        completion_tokens: parsed.usage.as_ref().and_then(|u| u.completion_tokens),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{ENV_API_KEY, ENV_BASE_URL, ENV_MODEL};
    use crate::test_support::{COMPLETIONS_PATH, api_base_url, completion_body, received_bodies};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(base_url: &str) -> Settings {
        let base_url = base_url.to_string();
        Settings::from_lookup(move |key| match key {
            ENV_API_KEY => Some("sk-test".to_string()),
            ENV_MODEL => Some("gpt-test".to_string()),
            ENV_BASE_URL => Some(base_url.clone()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_parse_success_payload() {
        let body = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-4-turbo-2024-04-09",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "  TC-001  \n"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;

        let completion = parse_completion(200, body).unwrap();
        assert_eq!(completion.text, "TC-001");
        assert_eq!(completion.model.as_deref(), Some("gpt-4-turbo-2024-04-09"));
        assert_eq!(completion.prompt_tokens, Some(12));
        assert_eq!(completion.completion_tokens, Some(3));
    }

    #[test]
    fn test_parse_uses_first_choice() {
        let body = r#"{"choices": [
            {"message": {"content": "first"}},
            {"message": {"content": "second"}}
        ]}"#;
        assert_eq!(parse_completion(200, body).unwrap().text, "first");
    }

    #[test]
    fn test_parse_api_error_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        let err = parse_completion(401, body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "LLM request failed: status 401: Incorrect API key provided (invalid_request_error)"
        );
    }

    #[test]
    fn test_parse_non_json_error_body() {
        let err = parse_completion(502, "Bad Gateway\n").unwrap_err();
        assert_eq!(err.to_string(), "LLM request failed: status 502: Bad Gateway");
    }

    #[test]
    fn test_parse_rejects_empty_content() {
        let body = r#"{"choices": [{"message": {"content": "   "}}]}"#;
        assert!(matches!(parse_completion(200, body), Err(TestgenError::Llm(_))));

        let body = r#"{"choices": []}"#;
        assert!(matches!(parse_completion(200, body), Err(TestgenError::Llm(_))));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = parse_completion(200, "<html>").unwrap_err();
        assert!(err.to_string().contains("invalid response payload"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_request_is_sent_with_bearer_token_and_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("analysis done")))
            .expect(1)
            .mount(&server)
            .await;

        let settings = settings_for(&api_base_url(&server));
        let completion = tokio::task::spawn_blocking(move || {
            let chat = OpenAiChat::new(&settings).unwrap();
            assert_eq!(chat.model_name(), "gpt-test");
            chat.complete(&[ChatMessage::system("You are a tester."), ChatMessage::user("Go")])
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(completion.text, "analysis done");
        assert_eq!(completion.model.as_deref(), Some("gpt-test-0001"));
        assert_eq!(completion.prompt_tokens, Some(10));

        let bodies = received_bodies(&server).await;
        assert_eq!(bodies.len(), 1);
        let body: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Go");
        assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_api_error_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let settings = settings_for(&api_base_url(&server));
        let err = tokio::task::spawn_blocking(move || {
            OpenAiChat::new(&settings)?.complete(&[ChatMessage::user("hi")])
        })
        .await
        .unwrap()
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "LLM request failed: status 401: Incorrect API key provided (invalid_request_error)"
        );
    }

    #[test]
    fn test_unreachable_server_is_llm_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let chat = OpenAiChat::new(&settings_for("http://127.0.0.1:9/v1")).unwrap();
        let err = chat.complete(&[ChatMessage::user("hi")]).unwrap_err();
        assert!(matches!(err, TestgenError::Llm(_)));
    }
}
