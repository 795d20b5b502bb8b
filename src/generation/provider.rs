//! AI text-generation boundary
//!
//! The engine consumes a single capability: given a system instruction and
//! a user prompt, return raw text. Provider and model selection are the
//! capability's concern; retry and timeout policy are the orchestrator's.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed")]
    AuthFailed,

    #[error("Provider error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Response carried no text content")]
    MissingContent,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// One prompt pair plus routing metadata, as sent to the capability
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Provider identifier (informational for remote gateways)
    pub provider: String,
    /// Model override; the implementation's default when `None`
    pub model: Option<String>,
}

/// Pluggable AI text-generation capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint
pub struct HttpTextGenerator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    default_model: String,
}

impl HttpTextGenerator {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        default_model: String,
    ) -> Result<Self, ProviderError> {
        // Normalize URL - ensure no trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ProviderError::InvalidUrl(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
            default_model,
        })
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let model = request.model.as_deref().unwrap_or(&self.default_model);

        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
        };

        let mut http_request = self.client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request.send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ProviderError::AuthFailed);
            }
            status if !status.is_success() => {
                let message = response.text().await.unwrap_or_default();
                return Err(ProviderError::Server {
                    status: status.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::MissingContent)
    }
}
