//! Palm photo selection: validation, compression and the storage write.

use super::compressor::{compress_async, CompressError, CompressedImage};
use super::workflow::Notice;
use crate::configuration::UploadSettings;
use crate::connectors::{ConnectorError, ObjectStorage};
use actix_web::web::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select an image file.")]
    NotAnImage,
    #[error("Please select an image smaller than {}MB.", .limit / (1024 * 1024))]
    TooLarge { size: usize, limit: usize },
}

impl ValidationError {
    pub fn title(&self) -> &'static str {
        match self {
            Self::NotAnImage => "Invalid file type",
            Self::TooLarge { .. } => "File too large",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Compress(#[from] CompressError),
    #[error(transparent)]
    Storage(#[from] ConnectorError),
}

impl UploadError {
    pub fn notice(&self) -> Notice {
        match self {
            Self::Validation(err) => Notice::error(err.title(), err.to_string()),
            Self::Compress(err) => Notice::error("Upload failed", err.to_string()),
            Self::Storage(err) => Notice::error("Upload failed", err.to_string()),
        }
    }
}

/// A file as the user picked it.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: Option<String>,
    /// MIME type as reported by the client
    pub content_type: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    /// Extension for the storage key: the file name's, else the MIME subtype.
    pub fn extension(&self) -> String {
        self.name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .or_else(|| self.content_type.split_once('/').map(|(_, sub)| sub))
            .unwrap_or("img")
            .to_ascii_lowercase()
    }
}

/// An accepted upload: the original is in storage, the compressed copy is
/// what gets previewed and analyzed.
#[derive(Debug, Clone, PartialEq)]
pub struct PalmImage {
    pub storage_key: String,
    pub compressed: CompressedImage,
}

pub struct UploadController {
    storage: Arc<dyn ObjectStorage>,
    settings: UploadSettings,
}

impl UploadController {
    pub fn new(storage: Arc<dyn ObjectStorage>, settings: UploadSettings) -> Self {
        Self { storage, settings }
    }

    pub fn validate(&self, file: &SelectedFile) -> Result<(), ValidationError> {
        if !file.content_type.starts_with("image/") {
            return Err(ValidationError::NotAnImage);
        }
        if file.bytes.len() > self.settings.max_file_bytes {
            return Err(ValidationError::TooLarge {
                size: file.bytes.len(),
                limit: self.settings.max_file_bytes,
            });
        }
        Ok(())
    }

    /// `{user_id}/{unix millis}.{ext}`
    pub fn storage_key(user_id: &str, file: &SelectedFile, now: DateTime<Utc>) -> String {
        format!("{}/{}.{}", user_id, now.timestamp_millis(), file.extension())
    }

    /// Validate, then compress and store the original concurrently.
    /// Both halves must succeed; a stored original is not removed when
    /// compression fails.
    #[tracing::instrument(
        name = "Select palm image",
        skip(self, file),
        fields(size = file.bytes.len(), content_type = %file.content_type)
    )]
    pub async fn select_file(
        &self,
        user_id: &str,
        file: SelectedFile,
    ) -> Result<PalmImage, UploadError> {
        self.validate(&file).map_err(|err| {
            tracing::info!("Rejected upload: {}", err);
            err
        })?;

        let storage_key = Self::storage_key(user_id, &file, Utc::now());
        let (compressed, stored) = tokio::join!(
            compress_async(
                file.bytes.clone(),
                self.settings.max_dimension,
                self.settings.jpeg_quality
            ),
            self.storage.put(
                &self.settings.storage_bucket,
                &storage_key,
                file.bytes.clone(),
                &file.content_type
            ),
        );

        let compressed = compressed.map_err(|err| {
            tracing::warn!("Compression failed: {}", err);
            err
        })?;
        stored?;

        tracing::info!(
            "Palm image stored as {} ({}x{} preview)",
            storage_key,
            compressed.width,
            compressed.height
        );
        Ok(PalmImage {
            storage_key,
            compressed,
        })
    }
}
