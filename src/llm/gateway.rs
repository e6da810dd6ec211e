//! Chat-completion gateway for OpenAI-compatible endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::LlmError;

/// Prompt used by the connectivity check.
pub const CONNECTION_TEST_PROMPT: &str = "Say hello in one word.";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
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

/// Trait for chat-completion backends.
///
/// This abstraction allows substituting the HTTP client in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send `messages` and return the raw reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;

    /// Send a minimal one-word prompt and return the trimmed reply.
    async fn test_connection(&self) -> Result<String, LlmError>;
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
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Gateway posting to `<base_url>/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    completions_url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiCompatClient {
    pub fn new(settings: &Settings) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(settings.llm_timeout)
            .build()
            .map_err(LlmError::Transport)?;

        Ok(Self {
            client,
            completions_url: completions_url(&settings.base_url),
            model: settings.effective_model().to_string(),
            temperature: settings.temperature,
            timeout: settings.llm_timeout,
        })
    }

    pub fn completions_url(&self) -> &str {
        &self.completions_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, messages: &[ChatMessage], temperature: f32) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature,
        };

        debug!(
            url = %self.completions_url,
            model = %self.model,
            messages = messages.len(),
            prompt_chars = messages.iter().map(|m| m.content.chars().count()).sum::<usize>(),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(&self.completions_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(LlmError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::InvalidResponse(format!("{e}: {}", preview(&body))))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                LlmError::InvalidResponse(format!("no message content in reply: {}", preview(&body)))
            })?;

        debug!(reply_chars = content.chars().count(), "received chat completion");
        Ok(content)
    }

    fn map_transport_error(&self, error: reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Transport(error)
        }
    }
}

#[async_trait]
impl LlmGateway for OpenAiCompatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.send(messages, self.temperature).await
    }

    async fn test_connection(&self) -> Result<String, LlmError> {
        let reply = self
            .send(&[ChatMessage::user(CONNECTION_TEST_PROMPT)], 0.0)
            .await?;
        let reply = reply.trim().to_string();
        info!(reply = %reply, "model endpoint reachable");
        Ok(reply)
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim().trim_end_matches('/'))
}

/// First 200 characters of a response body, for error messages.
fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
