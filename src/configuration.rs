use crate::connectors::ConnectorConfig;
use serde;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub app_port: u16,
    pub app_host: String,
    pub auth_url: String,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub progress: ProgressSettings,
    #[serde(default)]
    pub workflow: WorkflowSettings,
    #[serde(default)]
    pub connectors: ConnectorConfig,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
}

impl DatabaseSettings {
    // Connection string: postgresql://<username>:<password>@<host>:<port>/<database_name>
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name,
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port,
        )
    }
}

/// Limits applied when a palm photo is selected.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UploadSettings {
    #[serde(default = "UploadSettings::default_max_file_bytes")]
    pub max_file_bytes: usize,
    #[serde(default = "UploadSettings::default_max_dimension")]
    pub max_dimension: u32,
    /// JPEG quality in percent (70 == 0.7)
    #[serde(default = "UploadSettings::default_jpeg_quality")]
    pub jpeg_quality: u8,
    #[serde(default = "UploadSettings::default_storage_bucket")]
    pub storage_bucket: String,
}

impl UploadSettings {
    const fn default_max_file_bytes() -> usize {
        5 * 1024 * 1024
    }

    const fn default_max_dimension() -> u32 {
        800
    }

    const fn default_jpeg_quality() -> u8 {
        70
    }

    fn default_storage_bucket() -> String {
        "palm-images".to_string()
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_bytes: Self::default_max_file_bytes(),
            max_dimension: Self::default_max_dimension(),
            jpeg_quality: Self::default_jpeg_quality(),
            storage_bucket: Self::default_storage_bucket(),
        }
    }
}

/// How long an untouched per-user workflow is kept in memory.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    pub idle_timeout_secs: u64,
    pub auth_cache_ttl_secs: u64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 30 * 60,
            auth_cache_ttl_secs: 60,
        }
    }
}

/// Checkpoints (percent) and pacing (milliseconds) of the simulated reading progress.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    pub tick_ms: u64,
    pub upload_checkpoint: f64,
    pub analyze_checkpoint: f64,
    pub saving_checkpoint: f64,
    pub upload_pacing_ms: u64,
    pub analyze_pacing_ms: u64,
    pub saving_pacing_ms: u64,
    pub finalize_pacing_ms: u64,
    pub settle_ms: u64,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            tick_ms: 40,
            upload_checkpoint: 30.0,
            analyze_checkpoint: 80.0,
            saving_checkpoint: 90.0,
            upload_pacing_ms: 600,
            analyze_pacing_ms: 1000,
            saving_pacing_ms: 300,
            finalize_pacing_ms: 300,
            settle_ms: 350,
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // configuration.yaml / .json / .toml next to the binary
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration"))
        .build()?;

    let mut config: Settings = settings.try_deserialize()?;

    // Secrets never live in the configuration file
    config.connectors.load_secrets_from_env();

    Ok(config)
}
