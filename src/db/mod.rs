//! Persistence for profiles, readings and chat.
//!
//! Free functions per table take a `&PgPool`; `PgStore` bundles them behind
//! `ReadingStore` so services can run against `MemoryStore` in tests.
//! Errors are short user-facing strings; details are logged where they occur.

pub mod chat;
pub mod memory;
pub mod profile;
pub mod reading;

pub use memory::MemoryStore;

use crate::models::{
    ChatMessage, ChatSession, NewChatMessage, NewPalmReading, PalmReading, UserProfile,
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait ReadingStore: Send + Sync {
    async fn upsert_profile(&self, user_id: &str, profile: &UserProfile) -> Result<(), String>;

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, String>;

    async fn insert_reading(&self, reading: NewPalmReading) -> Result<PalmReading, String>;

    /// Most recent by `created_at`.
    async fn fetch_latest_reading(&self, user_id: &str) -> Result<Option<PalmReading>, String>;

    async fn fetch_reading(&self, id: Uuid, user_id: &str) -> Result<Option<PalmReading>, String>;

    async fn insert_chat_session(
        &self,
        user_id: &str,
        palm_reading_id: Option<Uuid>,
        title: &str,
    ) -> Result<ChatSession, String>;

    async fn fetch_chat_session(&self, id: Uuid, user_id: &str)
        -> Result<Option<ChatSession>, String>;

    async fn insert_chat_message(&self, message: NewChatMessage) -> Result<ChatMessage, String>;

    /// Ascending by `created_at`.
    async fn fetch_chat_messages(&self, chat_session_id: Uuid) -> Result<Vec<ChatMessage>, String>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingStore for PgStore {
    async fn upsert_profile(&self, user_id: &str, profile: &UserProfile) -> Result<(), String> {
        profile::upsert(&self.pool, user_id, profile).await
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, String> {
        profile::fetch(&self.pool, user_id).await
    }

    async fn insert_reading(&self, new_reading: NewPalmReading) -> Result<PalmReading, String> {
        reading::insert(&self.pool, new_reading).await
    }

    async fn fetch_latest_reading(&self, user_id: &str) -> Result<Option<PalmReading>, String> {
        reading::fetch_latest(&self.pool, user_id).await
    }

    async fn fetch_reading(&self, id: Uuid, user_id: &str) -> Result<Option<PalmReading>, String> {
        reading::fetch(&self.pool, id, user_id).await
    }

    async fn insert_chat_session(
        &self,
        user_id: &str,
        palm_reading_id: Option<Uuid>,
        title: &str,
    ) -> Result<ChatSession, String> {
        chat::insert_session(&self.pool, user_id, palm_reading_id, title).await
    }

    async fn fetch_chat_session(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<ChatSession>, String> {
        chat::fetch_session(&self.pool, id, user_id).await
    }

    async fn insert_chat_message(&self, message: NewChatMessage) -> Result<ChatMessage, String> {
        chat::insert_message(&self.pool, message).await
    }

    async fn fetch_chat_messages(&self, chat_session_id: Uuid) -> Result<Vec<ChatMessage>, String> {
        chat::fetch_messages(&self.pool, chat_session_id).await
    }
}
