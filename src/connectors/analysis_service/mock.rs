use super::AnalysisConnector;
use crate::connectors::errors::ConnectorError;
use crate::forms::AnalysisRequest;
use crate::models::{AnalysisOutcome, AnalysisResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers every call with the same outcome.
pub struct MockAnalysisConnector {
    outcome: Result<AnalysisOutcome, ConnectorError>,
    calls: AtomicUsize,
}

impl MockAnalysisConnector {
    pub fn completing() -> Self {
        Self::answering(Ok(AnalysisOutcome::Completed(AnalysisResult::sample())))
    }

    pub fn rejecting(message: &str) -> Self {
        Self::answering(Ok(AnalysisOutcome::Rejected(message.to_string())))
    }

    pub fn failing(message: &str) -> Self {
        Self::answering(Err(ConnectorError::ServiceUnavailable(message.to_string())))
    }

    pub fn answering(outcome: Result<AnalysisOutcome, ConnectorError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisConnector for MockAnalysisConnector {
    async fn analyze(&self, _request: &AnalysisRequest) -> Result<AnalysisOutcome, ConnectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
