use super::ReadingStore;
use crate::models::{
    ChatMessage, ChatSession, NewChatMessage, NewPalmReading, PalmReading, UserProfile,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    profiles: HashMap<String, UserProfile>,
    readings: Vec<PalmReading>,
    sessions: Vec<ChatSession>,
    messages: Vec<ChatMessage>,
}

/// Process-local `ReadingStore`. Backs the test harness and lets individual
/// tables be switched into a failing state.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    profile_writes: AtomicUsize,
    fail_profiles: AtomicBool,
    fail_readings: AtomicBool,
    fail_sessions: AtomicBool,
    fail_messages: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_profiles(&self, fail: bool) {
        self.fail_profiles.store(fail, Ordering::SeqCst);
    }

    pub fn fail_readings(&self, fail: bool) {
        self.fail_readings.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sessions(&self, fail: bool) {
        self.fail_sessions.store(fail, Ordering::SeqCst);
    }

    pub fn fail_messages(&self, fail: bool) {
        self.fail_messages.store(fail, Ordering::SeqCst);
    }

    /// Number of successful profile upserts, repeats included.
    pub fn profile_writes(&self) -> usize {
        self.profile_writes.load(Ordering::SeqCst)
    }

    pub async fn readings(&self) -> Vec<PalmReading> {
        self.tables.lock().await.readings.clone()
    }

    pub async fn sessions(&self) -> Vec<ChatSession> {
        self.tables.lock().await.sessions.clone()
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.tables.lock().await.messages.clone()
    }

    fn check(flag: &AtomicBool, message: &str) -> Result<(), String> {
        if flag.load(Ordering::SeqCst) {
            return Err(message.to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn upsert_profile(&self, user_id: &str, profile: &UserProfile) -> Result<(), String> {
        Self::check(&self.fail_profiles, "Failed to save your profile.")?;
        self.tables
            .lock()
            .await
            .profiles
            .insert(user_id.to_string(), profile.clone());
        self.profile_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, String> {
        Self::check(&self.fail_profiles, "Failed to load your profile.")?;
        Ok(self.tables.lock().await.profiles.get(user_id).cloned())
    }

    async fn insert_reading(&self, reading: NewPalmReading) -> Result<PalmReading, String> {
        Self::check(&self.fail_readings, "Failed to save your reading.")?;
        let saved = PalmReading {
            id: Uuid::new_v4(),
            user_id: reading.user_id,
            palm_image_url: reading.palm_image_url,
            analysis_data: reading.analysis_data,
            created_at: Utc::now(),
        };
        self.tables.lock().await.readings.push(saved.clone());
        Ok(saved)
    }

    async fn fetch_latest_reading(&self, user_id: &str) -> Result<Option<PalmReading>, String> {
        Self::check(&self.fail_readings, "Failed to load your reading.")?;
        // max_by_key keeps the last of equal keys, i.e. the latest insert
        Ok(self
            .tables
            .lock()
            .await
            .readings
            .iter()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn fetch_reading(&self, id: Uuid, user_id: &str) -> Result<Option<PalmReading>, String> {
        Self::check(&self.fail_readings, "Failed to load your reading.")?;
        Ok(self
            .tables
            .lock()
            .await
            .readings
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn insert_chat_session(
        &self,
        user_id: &str,
        palm_reading_id: Option<Uuid>,
        title: &str,
    ) -> Result<ChatSession, String> {
        Self::check(&self.fail_sessions, "Failed to create chat session.")?;
        let session = ChatSession {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            palm_reading_id,
            title: Some(title.to_string()),
            created_at: Utc::now(),
        };
        self.tables.lock().await.sessions.push(session.clone());
        Ok(session)
    }

    async fn fetch_chat_session(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<ChatSession>, String> {
        Self::check(&self.fail_sessions, "Failed to load chat session.")?;
        Ok(self
            .tables
            .lock()
            .await
            .sessions
            .iter()
            .find(|s| s.id == id && s.user_id == user_id)
            .cloned())
    }

    async fn insert_chat_message(&self, message: NewChatMessage) -> Result<ChatMessage, String> {
        Self::check(&self.fail_messages, "Failed to save message.")?;
        let saved = message.unsaved();
        self.tables.lock().await.messages.push(saved.clone());
        Ok(saved)
    }

    async fn fetch_chat_messages(&self, chat_session_id: Uuid) -> Result<Vec<ChatMessage>, String> {
        Self::check(&self.fail_messages, "Failed to load chat history.")?;
        let mut messages: Vec<ChatMessage> = self
            .tables
            .lock()
            .await
            .messages
            .iter()
            .filter(|m| m.chat_session_id == chat_session_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResult, HandPreference, MessageType};

    #[tokio::test]
    async fn latest_reading_is_the_newest_insert() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store
                .insert_reading(NewPalmReading {
                    user_id: "u1".to_string(),
                    palm_image_url: None,
                    analysis_data: AnalysisResult::sample(),
                })
                .await
                .unwrap();
        }
        let last = store.readings().await.pop().unwrap();

        let latest = store.fetch_latest_reading("u1").await.unwrap().unwrap();
        assert_eq!(latest.id, last.id);
        assert!(store.fetch_latest_reading("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_upserts_overwrite() {
        let store = MemoryStore::new();
        let mut profile = UserProfile {
            date_of_birth: None,
            hand_preference: HandPreference::Left,
            gender: None,
        };
        store.upsert_profile("u1", &profile).await.unwrap();
        profile.hand_preference = HandPreference::Both;
        store.upsert_profile("u1", &profile).await.unwrap();

        assert_eq!(store.profile_writes(), 2);
        assert_eq!(
            store.fetch_profile("u1").await.unwrap().unwrap().hand_preference,
            HandPreference::Both
        );
    }

    #[tokio::test]
    async fn sessions_are_scoped_to_their_owner() {
        let store = MemoryStore::new();
        let session = store
            .insert_chat_session("u1", None, "Palm Reading Chat")
            .await
            .unwrap();

        assert!(store.fetch_chat_session(session.id, "u2").await.unwrap().is_none());
        assert!(store.fetch_chat_session(session.id, "u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn failing_table_reports_error() {
        let store = MemoryStore::new();
        store.fail_messages(true);

        let err = store
            .insert_chat_message(NewChatMessage {
                chat_session_id: Uuid::new_v4(),
                user_id: "u1".to_string(),
                message_type: MessageType::User,
                content: "hi".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, "Failed to save message.");
    }
}
