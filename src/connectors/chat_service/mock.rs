use super::ChatConnector;
use crate::connectors::errors::ConnectorError;
use crate::forms::ChatRequest;
use async_trait::async_trait;
use std::sync::Mutex;

/// Echo-style assistant that records what it was asked.
pub struct MockChatConnector {
    answer: Result<String, ConnectorError>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatConnector {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Ok(answer.to_string()),
            requests: Mutex::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(ConnectorError::HttpError {
                status: 500,
                message: message.to_string(),
            }),
            requests: Mutex::default(),
        }
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatConnector for MockChatConnector {
    async fn reply(&self, request: &ChatRequest) -> Result<String, ConnectorError> {
        self.requests.lock().unwrap().push(request.clone());
        self.answer.clone()
    }
}
