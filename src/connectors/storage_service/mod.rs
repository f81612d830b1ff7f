//! Object storage for the original palm photos.

use crate::connectors::config::ConnectorConfig;
use crate::connectors::errors::ConnectorError;
use actix_web::web::{self, Bytes};
use async_trait::async_trait;
use std::sync::Arc;

pub mod client;
#[cfg(test)]
pub mod mock;

pub use client::StorageServiceClient;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write `bytes` under `bucket/key`; an existing object is an error.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), ConnectorError>;
}

pub fn init(connector_config: &ConnectorConfig) -> web::Data<Arc<dyn ObjectStorage>> {
    let config = connector_config.storage_service.clone();
    if config.service_key.is_none() {
        tracing::warn!("STORAGE_SERVICE_KEY is not set - uploads are sent unauthenticated");
    }
    tracing::info!("Initializing storage connector: {}", config.base_url);

    let connector: Arc<dyn ObjectStorage> = Arc::new(StorageServiceClient::new(config));
    web::Data::new(connector)
}
