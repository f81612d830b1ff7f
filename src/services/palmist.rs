//! The analysis and chat functions, answered in-process against the
//! inference provider. Also serves `/functions/v1/*`.

use super::prompts;
use crate::connectors::openai::{CompletionRequest, InferenceProvider, Message, Role};
use crate::connectors::{AnalysisConnector, ChatConnector, ConnectorError, OpenAiConfig};
use crate::forms::{AnalysisRequest, ChatRequest};
use crate::models::{AnalysisOutcome, AnalysisResult};
use async_trait::async_trait;
use std::sync::Arc;

pub const PARSE_FAILURE: &str = "Invalid response format from AI - could not parse analysis data";

pub struct Palmist {
    provider: Arc<dyn InferenceProvider>,
    analysis_model: String,
    chat_model: String,
}

impl Palmist {
    pub fn new(provider: Arc<dyn InferenceProvider>, config: &OpenAiConfig) -> Self {
        Self {
            provider,
            analysis_model: config.analysis_model.clone(),
            chat_model: config.chat_model.clone(),
        }
    }

    /// Read the model's answer: an `{error}` object is a rejection, anything
    /// else must be a complete result.
    fn read_analysis(content: &str) -> Result<AnalysisOutcome, ConnectorError> {
        let cleaned = prompts::strip_code_fences(content);
        let invalid = || ConnectorError::InvalidResponse(PARSE_FAILURE.to_string());

        let value: serde_json::Value = serde_json::from_str(&cleaned).map_err(|err| {
            tracing::error!("Failed to parse model answer: {:?}", err);
            invalid()
        })?;

        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            return Ok(AnalysisOutcome::Rejected(message.to_string()));
        }

        let analysis: AnalysisResult = serde_json::from_value(value).map_err(|err| {
            tracing::error!("Model answer is not a complete analysis: {:?}", err);
            invalid()
        })?;
        analysis.check().map_err(|err| {
            tracing::error!("Model answer out of range: {}", err);
            invalid()
        })?;

        Ok(AnalysisOutcome::Completed(analysis))
    }

    #[tracing::instrument(name = "Palmist reading", skip_all)]
    pub async fn generate_reading(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisOutcome, ConnectorError> {
        let completion = CompletionRequest {
            model: self.analysis_model.clone(),
            messages: vec![Message::with_image(
                prompts::palm_reading_prompt(&request.user_profile),
                request.palm_image_base64.clone(),
            )],
            max_tokens: 2000,
            temperature: 0.3,
        };

        let content = self.provider.complete(&completion).await?;
        let outcome = Self::read_analysis(&content)?;
        if let AnalysisOutcome::Rejected(message) = &outcome {
            tracing::info!("Invalid palm image detected: {}", message);
        }
        Ok(outcome)
    }

    #[tracing::instrument(name = "Palmist chat", skip_all, fields(history = request.chat_history.len()))]
    pub async fn chat(&self, request: &ChatRequest) -> Result<String, ConnectorError> {
        let mut messages = vec![Message::text(
            Role::System,
            prompts::chat_system_prompt(
                request.palm_analysis.as_ref(),
                request.user_profile.as_ref(),
            ),
        )];
        messages.extend(
            prompts::history_window(&request.chat_history)
                .iter()
                .map(|turn| {
                    let role = if turn.message_type == "user" {
                        Role::User
                    } else {
                        Role::Assistant
                    };
                    Message::text(role, turn.content.clone())
                }),
        );
        messages.push(Message::text(Role::User, request.message.clone()));

        let completion = CompletionRequest {
            model: self.chat_model.clone(),
            messages,
            max_tokens: 500,
            temperature: 0.8,
        };
        self.provider.complete(&completion).await
    }
}

#[async_trait]
impl AnalysisConnector for Palmist {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, ConnectorError> {
        self.generate_reading(request).await
    }
}

#[async_trait]
impl ChatConnector for Palmist {
    async fn reply(&self, request: &ChatRequest) -> Result<String, ConnectorError> {
        self.chat(request).await
    }
}
