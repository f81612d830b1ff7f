//! Chat invocation: message, analysis context, profile and prior turns in,
//! the assistant's answer out.

use crate::connectors::config::ConnectorConfig;
use crate::connectors::errors::ConnectorError;
use crate::forms::ChatRequest;
use actix_web::web;
use async_trait::async_trait;
use std::sync::Arc;

pub mod client;
#[cfg(test)]
pub mod mock;

pub use client::ChatServiceClient;

#[async_trait]
pub trait ChatConnector: Send + Sync {
    async fn reply(&self, request: &ChatRequest) -> Result<String, ConnectorError>;
}

pub fn init(
    connector_config: &ConnectorConfig,
    fallback: Arc<dyn ChatConnector>,
) -> web::Data<Arc<dyn ChatConnector>> {
    let config = &connector_config.chat_service;
    let connector: Arc<dyn ChatConnector> = if config.enabled {
        tracing::info!("Initializing chat connector: {}", config.base_url);
        Arc::new(ChatServiceClient::new(config.clone()))
    } else {
        tracing::info!("Chat service disabled - answering in-process");
        fallback
    };

    web::Data::new(connector)
}
