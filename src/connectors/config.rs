use serde::{Deserialize, Serialize};

/// Configuration for external service connectors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    pub analysis_service: AnalysisServiceConfig,
    pub chat_service: ChatServiceConfig,
    pub storage_service: StorageServiceConfig,
    pub openai: OpenAiConfig,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            analysis_service: AnalysisServiceConfig::default(),
            chat_service: ChatServiceConfig::default(),
            storage_service: StorageServiceConfig::default(),
            openai: OpenAiConfig::default(),
        }
    }
}

impl ConnectorConfig {
    /// Fill `#[serde(skip)]` credentials from the environment.
    pub fn load_secrets_from_env(&mut self) {
        let functions_key = std::env::var("FUNCTIONS_API_KEY").ok();
        if self.analysis_service.api_key.is_none() {
            self.analysis_service.api_key = functions_key.clone();
        }
        if self.chat_service.api_key.is_none() {
            self.chat_service.api_key = functions_key;
        }
        if self.storage_service.service_key.is_none() {
            self.storage_service.service_key = std::env::var("STORAGE_SERVICE_KEY").ok();
        }
        if self.openai.api_key.is_none() {
            self.openai.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
    }
}

/// Remote palm analysis function (`generate-palm-reading`).
/// Disabled means the analysis runs in-process against the inference provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisServiceConfig {
    pub enabled: bool,
    /// Functions root; the client posts to {base_url}/generate-palm-reading
    pub base_url: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// Sent as `apikey` header (from env: FUNCTIONS_API_KEY)
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AnalysisServiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:8000/functions/v1".to_string(),
            timeout_secs: 120,
            api_key: None,
        }
    }
}

/// Remote chat function (`chat-with-ai`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatServiceConfig {
    pub enabled: bool,
    /// The client posts to {base_url}/chat-with-ai
    pub base_url: String,
    pub timeout_secs: u64,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for ChatServiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:8000/functions/v1".to_string(),
            timeout_secs: 60,
            api_key: None,
        }
    }
}

/// Object storage for original uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageServiceConfig {
    /// Storage API root; objects go to {base_url}/object/{bucket}/{key}
    pub base_url: String,
    pub timeout_secs: u64,
    /// Bearer token (from env: STORAGE_SERVICE_KEY)
    #[serde(skip)]
    pub service_key: Option<String>,
}

impl Default for StorageServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321/storage/v1".to_string(),
            timeout_secs: 30,
            service_key: None,
        }
    }
}

/// OpenAI-compatible multimodal inference provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub analysis_model: String,
    pub chat_model: String,
    pub timeout_secs: u64,
    /// From env: OPENAI_API_KEY
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            analysis_model: "gpt-4o".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            timeout_secs: 120,
            api_key: None,
        }
    }
}
