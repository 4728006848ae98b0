use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::ClientConfig;
use crate::error::CompletionError;

/// Anything that can turn one prompt into one reply.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str, system_prompt: &str) -> Result<String, CompletionError>;
}

// Structures matching the OpenAI-compatible /chat/completions endpoint
#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    model: &'a str,
    temperature: f32,
    top_p: f32,
    stop: Option<Vec<String>>, // Always null; serialised explicitly
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Completion client for Groq's OpenAI-compatible chat endpoint.
///
/// Only the current turn is sent: one system message and one user message.
/// No timeout is set on the underlying client, so a hung connection hangs
/// the request.
#[derive(Debug, Clone)]
pub struct GroqClient {
    client: Client,
    config: ClientConfig,
}

impl GroqClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn build_request<'a>(&'a self, prompt: &'a str, system_prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            model: &self.config.model,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            stop: None,
        }
    }
}

#[async_trait]
impl CompletionService for GroqClient {
    #[instrument(skip(self, prompt, system_prompt), fields(model = %self.config.model))]
    async fn complete(&self, prompt: &str, system_prompt: &str) -> Result<String, CompletionError> {
        let request_payload = self.build_request(prompt, system_prompt);
        debug!(
            endpoint = %self.config.endpoint,
            prompt_len = prompt.len(),
            "Sending completion request"
        );

        let started = Instant::now();
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request_payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to reach completion endpoint");
                CompletionError::Transport(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        let elapsed = started.elapsed();

        if !status.is_success() {
            let body = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
            error!(%status, %body, ?elapsed, "Completion API request failed");
            return Err(CompletionError::Api { status, body });
        }

        info!(%status, ?elapsed, "Completion request finished");
        extract_content(&body)
    }
}

/// Pulls `choices[0].message.content` out of a success body.
fn extract_content(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::MalformedResponse("response has no choices".to_string()))?
        .message
        .content
        .ok_or_else(|| {
            CompletionError::MalformedResponse("first choice has no message content".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content_reads_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hallo!"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "Hallo!");
    }

    #[test]
    fn test_extract_content_rejects_empty_choices() {
        let err = extract_content(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_content_rejects_null_content() {
        let err = extract_content(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_content_rejects_non_json() {
        let err = extract_content("<html>oops</html>").unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));
    }

    #[test]
    fn test_request_serialises_current_turn_only() {
        let client = GroqClient::new(ClientConfig::new("http://localhost", "key"));
        let request = client.build_request("Wie geht es dir?", "system text");
        let value = serde_json::to_value(&request).unwrap();

        let messages = value["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "system text");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Wie geht es dir?");
        assert_eq!(value["model"], "llama3-8b-8192");
        assert_eq!(value["temperature"].as_f64(), Some(1.0));
        assert_eq!(value["top_p"].as_f64(), Some(1.0));
        assert!(value["stop"].is_null());
        assert!(value.as_object().unwrap().contains_key("stop"));
    }
}
