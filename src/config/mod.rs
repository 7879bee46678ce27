//! Configuration management

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ingest: IngestConfig,
    pub logging: LoggingConfig,
}

/// Ingestion pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Bucket receiving curated pack and run outputs
    pub curated_bucket: String,
    /// DynamoDB table holding the queryable index
    pub table_name: String,
    /// Account context rendered into standardized finding payloads.
    ///
    /// Injected configuration, never inferred from the invocation identity:
    /// the invocation ARN format is infrastructure-specific and not part of
    /// the ingestion contract.
    pub account_id: String,
    /// Region context for standardized finding payloads
    pub region: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            curated_bucket: String::new(),
            table_name: String::new(),
            account_id: "000000000000".to_string(),
            region: "ca-central-1".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Add local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("ADWATCH").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ingest.curated_bucket.is_empty() {
            return Err(ValidationError::new("ingest.curated_bucket must be set"));
        }
        if self.ingest.table_name.is_empty() {
            return Err(ValidationError::new("ingest.table_name must be set"));
        }
        if self.ingest.account_id.is_empty() {
            return Err(ValidationError::new("ingest.account_id must be set"));
        }
        if self.ingest.region.is_empty() {
            return Err(ValidationError::new("ingest.region must be set"));
        }
        Ok(())
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration validation error
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
