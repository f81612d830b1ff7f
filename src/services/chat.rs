//! Chat sessions about a palm reading.

use super::identity::Identity;
use super::workflow::Notice;
use crate::connectors::{ChatConnector, ConnectorError};
use crate::db::ReadingStore;
use crate::forms::{ChatRequest, HistoryTurn, PromptProfile};
use crate::models::{AnalysisResult, ChatMessage, ChatSession, MessageType, NewChatMessage, User};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const SESSION_TITLE: &str = "Palm Reading Chat";

pub const WELCOME_MESSAGE: &str = "Hello! I'm your Palm Vision guide. I've analyzed your palm and \
I'm here to provide personalized guidance. What would you like to know about your future? You \
can ask about career, relationships, health, or any specific life question!";

pub const QUICK_QUESTIONS: [&str; 4] = [
    "What does my career future look like?",
    "When will I find true love?",
    "What are my spiritual gifts?",
    "How can I improve my health?",
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChatError {
    #[error("Please log in to start a chat session.")]
    AuthRequired,
    #[error("Chat session not found.")]
    SessionNotFound,
    #[error("Failed to initialize chat session. Please try again.")]
    Persistence(String),
    #[error("Failed to load the conversation. Please try again.")]
    Unavailable(String),
    #[error("Failed to send message: {0}")]
    Transport(#[from] ConnectorError),
}

impl ChatError {
    pub fn notice(&self) -> Notice {
        let title = match self {
            Self::AuthRequired => "Authentication Error",
            Self::Persistence(_) => "Chat Initialization Error",
            Self::SessionNotFound | Self::Unavailable(_) | Self::Transport(_) => "Message Error",
        };
        Notice::error(title, self.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StartedSession {
    pub session: ChatSession,
    /// The welcome message, persisted or not.
    pub messages: Vec<ChatMessage>,
    pub quick_questions: [&'static str; 4],
}

#[derive(Debug, Clone)]
pub enum ChatStart {
    /// Identity still resolving; try again once it settles.
    AwaitingIdentity,
    Started(StartedSession),
}

/// One user turn and the assistant's answer, in that order.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}

pub struct ChatController {
    identity: Identity,
    store: Arc<dyn ReadingStore>,
    connector: Arc<dyn ChatConnector>,
}

impl ChatController {
    pub fn new(
        identity: Identity,
        store: Arc<dyn ReadingStore>,
        connector: Arc<dyn ChatConnector>,
    ) -> Self {
        Self {
            identity,
            store,
            connector,
        }
    }

    /// Write a message, falling back to an unsaved copy when the insert fails.
    async fn append(&self, message: NewChatMessage) -> ChatMessage {
        match self.store.insert_chat_message(message.clone()).await {
            Ok(saved) => saved,
            Err(err) => {
                tracing::error!(
                    "Error saving {} message: {}",
                    message.message_type.as_str(),
                    err
                );
                message.unsaved()
            }
        }
    }

    /// Create a session (never deduplicated) and seed the welcome message.
    #[tracing::instrument(name = "Start chat session", skip(self))]
    pub async fn start(&self, palm_reading_id: Option<Uuid>) -> Result<ChatStart, ChatError> {
        let user = match &self.identity {
            Identity::Pending => return Ok(ChatStart::AwaitingIdentity),
            Identity::Resolved(None) => return Err(ChatError::AuthRequired),
            Identity::Resolved(Some(user)) => user.clone(),
        };

        let session = self
            .store
            .insert_chat_session(&user.id, palm_reading_id, SESSION_TITLE)
            .await
            .map_err(ChatError::Persistence)?;
        tracing::info!("Chat session {} created", session.id);

        let welcome = self
            .append(NewChatMessage {
                chat_session_id: session.id,
                user_id: user.id.clone(),
                message_type: MessageType::Assistant,
                content: WELCOME_MESSAGE.to_string(),
            })
            .await;

        Ok(ChatStart::Started(StartedSession {
            session,
            messages: vec![welcome],
            quick_questions: QUICK_QUESTIONS,
        }))
    }

    /// Analysis of the session's reading (the latest one when the session has
    /// none) and the stored profile. Missing context is not an error.
    async fn context(
        &self,
        user: &User,
        session: &ChatSession,
    ) -> (Option<AnalysisResult>, Option<PromptProfile>) {
        let reading = match session.palm_reading_id {
            Some(id) => self.store.fetch_reading(id, &user.id).await,
            None => self.store.fetch_latest_reading(&user.id).await,
        };
        let analysis = reading
            .map_err(|err| tracing::error!("Chat context without reading: {}", err))
            .ok()
            .flatten()
            .map(|r| r.analysis_data);

        let profile = self
            .store
            .fetch_profile(&user.id)
            .await
            .map_err(|err| tracing::error!("Chat context without profile: {}", err))
            .ok()
            .flatten()
            .map(|p| PromptProfile::from(&p));

        (analysis, profile)
    }

    /// Relay one user turn. Blank text, no session or no user is a no-op
    /// (`Ok(None)`). On a failed reply the user's message stays in history
    /// without an answer.
    #[tracing::instrument(name = "Send chat message", skip(self, text))]
    pub async fn send(
        &self,
        session_id: Option<Uuid>,
        text: &str,
    ) -> Result<Option<Exchange>, ChatError> {
        let (Some(session_id), Some(user)) = (session_id, self.identity.user()) else {
            return Ok(None);
        };
        if text.trim().is_empty() {
            return Ok(None);
        }

        let session = self
            .store
            .fetch_chat_session(session_id, &user.id)
            .await
            .map_err(ChatError::Unavailable)?
            .ok_or(ChatError::SessionNotFound)?;

        let user_message = self
            .append(NewChatMessage {
                chat_session_id: session.id,
                user_id: user.id.clone(),
                message_type: MessageType::User,
                content: text.to_string(),
            })
            .await;

        let history = self
            .store
            .fetch_chat_messages(session.id)
            .await
            .unwrap_or_else(|err| {
                tracing::error!("Chat history unavailable: {}", err);
                vec![]
            });
        let (palm_analysis, user_profile) = self.context(user, &session).await;

        let request = ChatRequest {
            message: text.to_string(),
            palm_analysis,
            user_profile,
            chat_history: history.iter().map(HistoryTurn::from).collect(),
        };
        let answer = self.connector.reply(&request).await.map_err(|err| {
            tracing::error!("Error sending message: {}", err);
            ChatError::Transport(err)
        })?;

        let assistant_message = self
            .append(NewChatMessage {
                chat_session_id: session.id,
                user_id: user.id.clone(),
                message_type: MessageType::Assistant,
                content: answer,
            })
            .await;

        Ok(Some(Exchange {
            user_message,
            assistant_message,
        }))
    }

    /// Stored messages of one of the user's sessions, oldest first.
    pub async fn history(&self, session_id: Uuid) -> Result<Vec<ChatMessage>, ChatError> {
        let user = self.identity.user().ok_or(ChatError::AuthRequired)?;
        self.store
            .fetch_chat_session(session_id, &user.id)
            .await
            .map_err(ChatError::Unavailable)?
            .ok_or(ChatError::SessionNotFound)?;

        self.store
            .fetch_chat_messages(session_id)
            .await
            .map_err(ChatError::Unavailable)
    }
}
