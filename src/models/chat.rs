use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    User,
    Assistant,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(format!("unknown message type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: String,
    pub palm_reading_id: Option<Uuid>,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Append-only conversation entry, ordered by `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub chat_session_id: Uuid,
    pub user_id: String,
    pub message_type: MessageType,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub chat_session_id: Uuid,
    pub user_id: String,
    pub message_type: MessageType,
    pub content: String,
}

impl NewChatMessage {
    /// In-memory copy for when the insert did not go through.
    pub fn unsaved(self) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4(),
            chat_session_id: self.chat_session_id,
            user_id: self.user_id,
            message_type: self.message_type,
            content: self.content,
            created_at: Utc::now(),
        }
    }
}
