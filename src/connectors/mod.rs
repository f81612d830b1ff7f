//! External collaborators.
//!
//! Every integration is a trait (`async_trait`, `Send + Sync`) with an HTTP
//! client next to it and a `#[cfg(test)]` mock, so services and routes only
//! ever hold `Arc<dyn Trait>`:
//!
//! ```ignore
//! pub async fn handler(storage: web::Data<Arc<dyn ObjectStorage>>) -> Result<impl Responder> {
//!     storage.put("palm-images", "user/1.jpg", bytes, "image/jpeg").await?;
//! }
//! ```

pub mod analysis_service;
pub mod chat_service;
pub mod config;
pub mod errors;
pub mod openai;
pub mod storage_service;

pub use analysis_service::{AnalysisConnector, AnalysisServiceClient};
pub use chat_service::{ChatConnector, ChatServiceClient};
pub use config::{
    AnalysisServiceConfig, ChatServiceConfig, ConnectorConfig, OpenAiConfig, StorageServiceConfig,
};
pub use errors::ConnectorError;
pub use openai::{InferenceProvider, OpenAiClient};
pub use storage_service::{ObjectStorage, StorageServiceClient};

pub use analysis_service::init as init_analysis_service;
pub use chat_service::init as init_chat_service;
pub use openai::init as init_openai;
pub use storage_service::init as init_storage_service;
