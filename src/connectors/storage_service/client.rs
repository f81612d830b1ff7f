use super::ObjectStorage;
use crate::connectors::config::StorageServiceConfig;
use crate::connectors::errors::{error_message, ConnectorError};
use actix_web::web::Bytes;
use async_trait::async_trait;
use tracing::Instrument;

pub struct StorageServiceClient {
    base_url: String,
    service_key: Option<String>,
    http_client: reqwest::Client,
}

impl StorageServiceClient {
    pub fn new(config: StorageServiceConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key,
            http_client,
        }
    }

    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, bucket, key)
    }
}

#[async_trait]
impl ObjectStorage for StorageServiceClient {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), ConnectorError> {
        let span = tracing::info_span!(
            "storage_put",
            bucket = %bucket,
            key = %key,
            size = bytes.len()
        );

        let mut req = self
            .http_client
            .post(self.object_url(bucket, key))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);
        if let Some(token) = self.service_key.as_deref() {
            req = req.bearer_auth(token);
        }

        let resp = req.send().instrument(span).await.map_err(|e| {
            tracing::error!("storage request failed: {:?}", e);
            ConnectorError::from(e)
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        let message =
            error_message(&body).unwrap_or_else(|| format!("Upload failed with status {}", status));
        tracing::error!("storage rejected {}/{}: {}", bucket, key, message);

        Err(match status.as_u16() {
            401 | 403 => ConnectorError::Unauthorized(message),
            404 => ConnectorError::NotFound(message),
            code => ConnectorError::HttpError {
                status: code,
                message,
            },
        })
    }
}
