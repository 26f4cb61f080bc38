//! Configuration management for pacsweb
//!
//! This module handles loading, validation, and management of
//! pacsweb configuration from YAML files.

pub mod error;

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigErrorDetails, ConfigResult};

// ==================== Configuration Types ====================

/// Ledger API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the REST API
    #[serde(default = "default_host")]
    pub host: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// API token (optional, may come from the token cache instead)
    #[serde(default)]
    pub token: Option<String>,
    /// Local storage file for the encrypted token and flag overrides
    #[serde(default = "default_token_store")]
    pub token_store: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_store: default_token_store(),
        }
    }
}

fn default_token_store() -> PathBuf {
    PathBuf::from("./pacsweb-storage.json")
}

/// Feature toggles
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeaturesConfig {
    /// Server-side toggles, sent in the `Pacs-Feature-Toggles` header
    #[serde(default)]
    pub toggles: Vec<String>,
    /// Client-side flag defaults
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Journal rows per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    25
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Number of decimal places shown for quantities
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            decimal_places: default_decimal_places(),
        }
    }
}

fn default_decimal_places() -> u32 {
    2
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        debug!("Config loaded from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        let host = self.server.host.trim();
        if host.is_empty() || !host.starts_with("http") {
            return Err(ConfigError::InvalidValue {
                field: "server.host".to_string(),
                reason: "Host must be an http(s) URL".to_string(),
            });
        }

        if self.pagination.page_size == 0 || self.pagination.page_size > 1000 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.page_size".to_string(),
                reason: "Page size must be between 1 and 1000".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Check if a client-side flag is enabled by default
    pub fn is_feature_enabled(&self, feature: &str) -> bool {
        self.features.flags.get(feature).copied().unwrap_or(false)
    }

    /// Token from the config, ignoring blank values
    pub fn token(&self) -> Option<&str> {
        self.auth
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_template_is_valid() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.server.host, "http://localhost:8000");
        assert_eq!(config.pagination.page_size, 25);
        assert!(!config.is_feature_enabled("TOKEN_IN_EXCHANGE_FETCHER"));
        assert!(config.token().is_none());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::from_yaml("server:\n  host: https://pacs.example.com\n").unwrap();
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.currency.decimal_places, 2);
        assert!(config.features.toggles.is_empty());
    }

    #[test]
    fn test_invalid_host() {
        let err = Config::from_yaml("server:\n  host: ftp://nope\n").unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "server.host"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_invalid_page_size() {
        let err = Config::from_yaml("pagination:\n  page_size: 0\n").unwrap_err();
        assert!(err.to_details().field.as_deref() == Some("pagination.page_size"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml { .. }));
    }

    #[test]
    fn test_blank_token_is_none() {
        let config = Config::from_yaml("auth:\n  token: '  '\n").unwrap();
        assert!(config.token().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "auth:\n  token: abc123\nfeatures:\n  toggles: [foo, bar]").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.token(), Some("abc123"));
        assert_eq!(config.features.toggles, vec!["foo", "bar"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        assert!(!err.to_details().hints.is_empty());
    }
}
