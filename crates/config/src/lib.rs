//! Configuration loading, validation, and management for TutorAgent.
//!
//! Loads configuration from a TOML file with environment variable
//! overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `tutoragent.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key. Usually supplied via `GEMINI_API_KEY` instead of
    /// being written to disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier passed to the Gemini API
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for tutoring completions
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per LLM response
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Session store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Session lifetime configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Document upload configuration
    #[serde(default)]
    pub upload: UploadConfig,
}

fn default_model() -> String {
    "gemini-1.5-flash-latest".into()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    2048
}

/// HTTP gateway settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. Empty list means allow any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Which session store backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Persistent SQLite-backed store
    Sqlite,
    /// Process-local store, lost on restart
    Memory,
}

/// Session store settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend selection
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// SQLite database path (ignored by the memory backend)
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_backend() -> StoreBackend {
    StoreBackend::Sqlite
}

fn default_store_path() -> PathBuf {
    PathBuf::from("tutoragent.db")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_store_path(),
        }
    }
}

/// Session expiry settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// TTL for plain chat sessions, in seconds
    #[serde(default = "default_chat_ttl")]
    pub chat_ttl_secs: u64,

    /// TTL for document-backed sessions, in seconds
    #[serde(default = "default_pdf_ttl")]
    pub pdf_ttl_secs: u64,
}

fn default_chat_ttl() -> u64 {
    3600
}

fn default_pdf_ttl() -> u64 {
    7200
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chat_ttl_secs: default_chat_ttl(),
            pdf_ttl_secs: default_pdf_ttl(),
        }
    }
}

/// Upload limits.
#[derive(Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted file size in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,

    /// Accepted file extensions (lowercase, no dot)
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_max_file_size() -> usize {
    10 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["pdf".into()]
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path with env overrides applied.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("tutoragent.toml"))
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of file values.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(model) = std::env::var("TUTORAGENT_MODEL") {
            if !model.is_empty() {
                self.model = model;
            }
        }
        if let Ok(port) = std::env::var("TUTORAGENT_PORT") {
            if let Ok(port) = port.parse() {
                self.gateway.port = port;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_output_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_output_tokens must be > 0".into(),
            ));
        }

        if self.session.chat_ttl_secs == 0 || self.session.pdf_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "session TTLs must be > 0 seconds".into(),
            ));
        }

        if self.upload.max_file_size == 0 {
            return Err(ConfigError::ValidationError(
                "upload.max_file_size must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` output).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            gateway: GatewayConfig::default(),
            store: StoreConfig::default(),
            session: SessionConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

// Manual Debug so the API key never lands in logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("gateway.host", &self.gateway.host)
            .field("gateway.port", &self.gateway.port)
            .field("store.backend", &self.store.backend)
            .finish_non_exhaustive()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model, "gemini-1.5-flash-latest");
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.session.chat_ttl_secs, 3600);
        assert_eq!(config.session.pdf_ttl_secs, 7200);
        assert_eq!(config.upload.max_file_size, 10 * 1024 * 1024);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.store.backend, StoreBackend::Sqlite);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_ttl_rejected() {
        let mut config = AppConfig::default();
        config.session.chat_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/tutoragent.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().gateway.host, "127.0.0.1");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let toml_str = r#"
model = "gemini-1.5-pro-latest"

[gateway]
port = 9000
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model, "gemini-1.5-pro-latest");
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.session.chat_ttl_secs, 3600);
    }

    #[test]
    fn memory_backend_parses() {
        let config: AppConfig = toml::from_str("[store]\nbackend = \"memory\"\n").unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("secret-key".into()),
            ..AppConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn load_from_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tutoragent.toml");
        std::fs::write(&path, "temperature = 0.3\n").unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert!((config.temperature - 0.3).abs() < f32::EPSILON);
    }
}
