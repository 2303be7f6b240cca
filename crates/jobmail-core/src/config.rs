//! Configuration management
//!
//! Handles configuration from environment variables and TOML config files
//! with sensible defaults for development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// NER provider configuration
    pub ner: NerConfig,

    /// Extraction lookup tables
    pub extraction: ExtractionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            config.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "API_PORT".to_string(),
                value: port,
            })?;
        }

        // CORS origins from environment variable (comma-separated)
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // NER
        if let Ok(provider) = std::env::var("NER_PROVIDER") {
            config.ner.provider = provider.parse()?;
        }
        if let Ok(url) = std::env::var("NER_URL") {
            config.ner.remote_url = url;
        }
        if let Ok(timeout) = std::env::var("NER_TIMEOUT_SECS") {
            config.ner.timeout_secs = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                key: "NER_TIMEOUT_SECS".to_string(),
                value: timeout,
            })?;
        }

        // Extraction
        if let Ok(path) = std::env::var("LEXICON_PATH") {
            config.extraction.lexicon_path = Some(PathBuf::from(path));
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = matches!(json.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;

        // Only override if env values differ from defaults
        if env_config.server.host != ServerConfig::default().host {
            self.server.host = env_config.server.host;
        }
        if env_config.server.port != ServerConfig::default().port {
            self.server.port = env_config.server.port;
        }
        if !env_config.server.cors_origins.is_empty() {
            self.server.cors_origins = env_config.server.cors_origins;
        }
        if env_config.ner.provider != NerConfig::default().provider {
            self.ner.provider = env_config.ner.provider;
        }
        if env_config.ner.remote_url != NerConfig::default().remote_url {
            self.ner.remote_url = env_config.ner.remote_url;
        }
        if env_config.ner.timeout_secs != NerConfig::default().timeout_secs {
            self.ner.timeout_secs = env_config.ner.timeout_secs;
        }
        if env_config.extraction.lexicon_path.is_some() {
            self.extraction.lexicon_path = env_config.extraction.lexicon_path;
        }
        if env_config.logging.level != LoggingConfig::default().level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format != LoggingConfig::default().json_format {
            self.logging.json_format = env_config.logging.json_format;
        }

        Ok(self)
    }

    /// Socket address string the API binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Allowed origins for CORS (empty means any origin)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_size: 1024 * 1024, // 1MB
            cors_enabled: true,
            cors_origins: vec![],
        }
    }
}

/// NER capability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    /// Which tagger backs the NER step
    pub provider: NerProvider,

    /// Base URL of the remote NER service
    pub remote_url: String,

    /// Request timeout in seconds for the remote NER service
    pub timeout_secs: u64,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            provider: NerProvider::Rules,
            remote_url: "http://localhost:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Supported NER providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NerProvider {
    /// In-process gazetteer and pattern tagger
    Rules,
    /// HTTP NER service
    Remote,
}

impl NerProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::Remote => "remote",
        }
    }
}

impl std::str::FromStr for NerProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rules" | "rule" => Ok(Self::Rules),
            "remote" | "http" => Ok(Self::Remote),
            _ => Err(ConfigError::InvalidValue {
                key: "NER_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExtractionConfig {
    /// TOML file overriding the built-in lookup tables
    pub lexicon_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
