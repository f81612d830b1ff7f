//! Palm analysis invocation: a profile plus a compressed photo in, a full
//! `AnalysisResult` or a content rejection out.

use crate::connectors::config::ConnectorConfig;
use crate::connectors::errors::ConnectorError;
use crate::forms::AnalysisRequest;
use crate::models::AnalysisOutcome;
use actix_web::web;
use async_trait::async_trait;
use std::sync::Arc;

pub mod client;
#[cfg(test)]
pub mod mock;

pub use client::AnalysisServiceClient;

#[async_trait]
pub trait AnalysisConnector: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, ConnectorError>;
}

/// Remote function when enabled, otherwise `fallback` (the in-process palmist).
pub fn init(
    connector_config: &ConnectorConfig,
    fallback: Arc<dyn AnalysisConnector>,
) -> web::Data<Arc<dyn AnalysisConnector>> {
    let config = &connector_config.analysis_service;
    let connector: Arc<dyn AnalysisConnector> = if config.enabled {
        tracing::info!("Initializing analysis connector: {}", config.base_url);
        Arc::new(AnalysisServiceClient::new(config.clone()))
    } else {
        tracing::info!("Analysis service disabled - analyzing in-process");
        fallback
    };

    web::Data::new(connector)
}
