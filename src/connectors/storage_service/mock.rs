use super::ObjectStorage;
use crate::connectors::errors::ConnectorError;
use actix_web::web::Bytes;
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub size: usize,
    pub content_type: String,
}

#[derive(Default)]
pub struct MockObjectStorage {
    failure: Option<ConnectorError>,
    pub objects: Mutex<Vec<StoredObject>>,
}

impl MockObjectStorage {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(ConnectorError::HttpError {
                status: 500,
                message: message.to_string(),
            }),
            objects: Mutex::default(),
        }
    }

    pub fn stored(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), ConnectorError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.objects.lock().unwrap().push(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size: bytes.len(),
            content_type: content_type.to_string(),
        });
        Ok(())
    }
}
