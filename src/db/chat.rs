use crate::models::{ChatMessage, ChatSession, MessageType, NewChatMessage};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct ChatMessageRow {
    id: Uuid,
    chat_session_id: Uuid,
    user_id: String,
    message_type: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<ChatMessageRow> for ChatMessage {
    fn from(row: ChatMessageRow) -> Self {
        Self {
            id: row.id,
            chat_session_id: row.chat_session_id,
            user_id: row.user_id,
            // anything that is not the user speaks as the assistant
            message_type: row
                .message_type
                .parse()
                .unwrap_or(MessageType::Assistant),
            content: row.content,
            created_at: row.created_at,
        }
    }
}

pub async fn insert_session(
    pool: &PgPool,
    user_id: &str,
    palm_reading_id: Option<Uuid>,
    title: &str,
) -> Result<ChatSession, String> {
    let query_span = tracing::info_span!("Saving chat session", user_id = %user_id);
    sqlx::query_as::<_, ChatSession>(
        r#"
        INSERT INTO chat_sessions (id, user_id, palm_reading_id, title, created_at, updated_at)
        VALUES ($1, $2, $3, $4, NOW(), NOW())
        RETURNING id, user_id, palm_reading_id, title, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(palm_reading_id)
    .bind(title)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to execute query: {:?}", err);
        "Failed to create chat session.".to_string()
    })
}

pub async fn fetch_session(
    pool: &PgPool,
    id: Uuid,
    user_id: &str,
) -> Result<Option<ChatSession>, String> {
    let query_span = tracing::info_span!("Fetching chat session", id = %id);
    sqlx::query_as::<_, ChatSession>(
        r#"
        SELECT id, user_id, palm_reading_id, title, created_at
        FROM chat_sessions
        WHERE id = $1 AND user_id = $2
        LIMIT 1
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch chat session: {:?}", err);
        "Failed to load chat session.".to_string()
    })
}

pub async fn insert_message(pool: &PgPool, message: NewChatMessage) -> Result<ChatMessage, String> {
    let query_span = tracing::info_span!(
        "Saving chat message",
        chat_session_id = %message.chat_session_id,
        message_type = message.message_type.as_str()
    );
    sqlx::query_as::<_, ChatMessageRow>(
        r#"
        INSERT INTO chat_messages (id, chat_session_id, user_id, message_type, content, created_at)
        VALUES ($1, $2, $3, $4, $5, clock_timestamp())
        RETURNING id, chat_session_id, user_id, message_type, content, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(message.chat_session_id)
    .bind(&message.user_id)
    .bind(message.message_type.as_str())
    .bind(&message.content)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map(ChatMessage::from)
    .map_err(|err| {
        tracing::error!("Failed to execute query: {:?}", err);
        "Failed to save message.".to_string()
    })
}

pub async fn fetch_messages(pool: &PgPool, chat_session_id: Uuid) -> Result<Vec<ChatMessage>, String> {
    let query_span = tracing::info_span!("Fetching chat history", chat_session_id = %chat_session_id);
    sqlx::query_as::<_, ChatMessageRow>(
        r#"
        SELECT id, chat_session_id, user_id, message_type, content, created_at
        FROM chat_messages
        WHERE chat_session_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(chat_session_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map(|rows| rows.into_iter().map(ChatMessage::from).collect())
    .map_err(|err| {
        tracing::error!("Failed to fetch chat history: {:?}", err);
        "Failed to load chat history.".to_string()
    })
}
