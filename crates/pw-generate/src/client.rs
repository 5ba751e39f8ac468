//! Chat completions client.

use async_trait::async_trait;
use pw_config::GenerationConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// One completion call, independent of the wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_instruction: String,
    pub user_instruction: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Send `request` and return the raw completion text.
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String, GenerationError>;
}

/// Talks to an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    endpoint: String,
    model: String,
}

impl OpenAiClient {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(&config.endpoint, &config.model)
    }
}

#[async_trait]
impl CompletionApi for OpenAiClient {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String, GenerationError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_instruction,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body_text));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        Ok(extract_text(parsed))
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// First choice's content. Missing content reads as empty text.
fn extract_text(response: ChatCompletionResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default()
}

fn map_http_error(status: StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .ok()
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("generation service error")
                .to_string()
        });
    GenerationError::Service {
        status: status.as_u16(),
        message,
    }
}
