use super::ChatConnector;
use crate::connectors::config::ChatServiceConfig;
use crate::connectors::errors::{error_message, ConnectorError};
use crate::forms::{ChatReply, ChatRequest};
use async_trait::async_trait;
use tracing::Instrument;

/// Calls a deployed `chat-with-ai` function.
pub struct ChatServiceClient {
    base_url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl ChatServiceClient {
    pub fn new(config: ChatServiceConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            http_client,
        }
    }
}

pub(crate) fn read_reply(status: u16, body: &str) -> Result<String, ConnectorError> {
    if !(200..300).contains(&status) {
        return Err(ConnectorError::HttpError {
            status,
            message: error_message(body)
                .unwrap_or_else(|| format!("Chat failed with status {}", status)),
        });
    }

    serde_json::from_str::<ChatReply>(body)
        .map(|reply| reply.response)
        .map_err(|_| ConnectorError::InvalidResponse(body.to_string()))
}

#[async_trait]
impl ChatConnector for ChatServiceClient {
    async fn reply(&self, request: &ChatRequest) -> Result<String, ConnectorError> {
        let span = tracing::info_span!(
            "chat_service_reply",
            history = request.chat_history.len(),
            has_analysis = request.palm_analysis.is_some()
        );

        let url = format!("{}/chat-with-ai", self.base_url);
        let mut req = self.http_client.post(&url).json(request);
        if let Some(key) = self.api_key.as_deref() {
            req = req.header("apikey", key).bearer_auth(key);
        }

        let resp = req.send().instrument(span).await.map_err(|e| {
            tracing::error!("chat request failed: {:?}", e);
            ConnectorError::from(e)
        })?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        read_reply(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_text() {
        assert_eq!(
            read_reply(200, r#"{"response":"Your fate line is strong."}"#).unwrap(),
            "Your fate line is strong."
        );
    }

    #[test]
    fn error_body_message_is_kept() {
        let err = read_reply(500, r#"{"error":"OpenAI API error: 502"}"#).unwrap_err();
        assert_eq!(err.to_string(), "OpenAI API error: 502");
    }

    #[test]
    fn missing_response_field() {
        let err = read_reply(200, r#"{"text":"hi"}"#).unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidResponse(_)));
    }
}
