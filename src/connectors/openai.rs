//! Chat-completions client for the multimodal inference provider used by the
//! analysis and chat functions.

use super::config::{ConnectorConfig, OpenAiConfig};
use super::errors::{error_message, ConnectorError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user turn carrying a prompt and one high-detail image.
    pub fn with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_url.into(),
                        detail: "high".to_string(),
                    },
                },
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub const QUOTA_EXCEEDED: &str =
    "API quota exceeded. Please check your OpenAI billing and usage limits.";
pub const INVALID_KEY: &str = "Invalid OpenAI API key. Please check your API key configuration.";
pub const INVALID_FORMAT: &str = "Invalid response format from OpenAI API";
pub const MISSING_KEY: &str = "OpenAI API key not configured";

#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Text of the first choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ConnectorError>;
}

pub struct OpenAiClient {
    endpoint: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: config.endpoint,
            api_key: config.api_key,
            http_client,
        }
    }
}

/// Map a provider answer to the assistant text or the user-facing error.
fn read_completion(status: u16, body: &str) -> Result<String, ConnectorError> {
    match status {
        200..=299 => {}
        429 => return Err(ConnectorError::RateLimited(QUOTA_EXCEEDED.to_string())),
        401 => return Err(ConnectorError::Unauthorized(INVALID_KEY.to_string())),
        _ => {
            let message = serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(|s| s.to_string()))
                .unwrap_or_else(|| format!("OpenAI API error: {}", status));
            return Err(ConnectorError::HttpError { status, message });
        }
    }

    serde_json::from_str::<CompletionResponse>(body)
        .ok()
        .and_then(|response| response.choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| ConnectorError::InvalidResponse(INVALID_FORMAT.to_string()))
}

#[async_trait]
impl InferenceProvider for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ConnectorError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ConnectorError::Internal(MISSING_KEY.to_string()))?;

        let span = tracing::info_span!(
            "openai_complete",
            model = %request.model,
            messages = request.messages.len()
        );

        let resp = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .instrument(span)
            .await
            .map_err(|e| {
                tracing::error!("OpenAI request failed: {:?}", e);
                ConnectorError::from(e)
            })?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;

        read_completion(status, &body).map_err(|err| {
            tracing::error!(status, "OpenAI API error: {}", error_message(&body).unwrap_or_default());
            err
        })
    }
}

/// Inference provider for the in-process functions.
pub fn init(connector_config: &ConnectorConfig) -> Arc<dyn InferenceProvider> {
    let config = connector_config.openai.clone();
    if config.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set - in-process analysis and chat will fail");
    } else {
        tracing::info!("Initializing OpenAI client: {}", config.endpoint);
    }
    Arc::new(OpenAiClient::new(config))
}
