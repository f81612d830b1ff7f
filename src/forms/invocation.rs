//! Request and response bodies of the two remote functions: palm analysis
//! and chat. Shared by the HTTP connectors (serialize) and by the function
//! routes this service hosts (deserialize).

use crate::models::{AnalysisResult, ChatMessage, UserProfile};
use serde::{Deserialize, Serialize};

/// Profile as the prompts see it. Lenient on purpose: browsers send `""`
/// for unanswered fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl From<&UserProfile> for PromptProfile {
    fn from(profile: &UserProfile) -> Self {
        Self {
            date_of_birth: profile.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
            hand_preference: Some(profile.hand_preference.to_string()),
            gender: profile.gender.map(|g| g.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub user_profile: PromptProfile,
    /// `data:image/jpeg;base64,...`
    pub palm_image_base64: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub analysis_data: AnalysisResult,
}

/// A history entry as sent to the chat function; extra row columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub message_type: String,
    pub content: String,
}

impl From<&ChatMessage> for HistoryTurn {
    fn from(message: &ChatMessage) -> Self {
        Self {
            message_type: message.message_type.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub palm_analysis: Option<AnalysisResult>,
    #[serde(default)]
    pub user_profile: Option<PromptProfile>,
    #[serde(default)]
    pub chat_history: Vec<HistoryTurn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// `{error}` body returned by both functions on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
