//! Error types for pacsweb-config

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigErrorCode {
    FileNotFound,
    InvalidYaml,
    InvalidValue,
    IoError,
}

impl ConfigErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ConfigErrorCode::InvalidYaml => "INVALID_YAML",
            ConfigErrorCode::InvalidValue => "INVALID_VALUE",
            ConfigErrorCode::IoError => "IO_ERROR",
        }
    }
}

impl std::fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the binary prints when the configuration cannot be used
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigErrorDetails {
    pub code: ConfigErrorCode,
    pub message: String,
    /// Dotted path of the offending setting, e.g. `server.host`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl std::fmt::Display for ConfigErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "[{}] {} ({})", self.code, self.message, field)?,
            None => write!(f, "[{}] {}", self.code, self.message)?,
        }
        for hint in &self.hints {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config is not valid YAML: {message}")]
    InvalidYaml { message: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Could not read config: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    pub fn code(&self) -> ConfigErrorCode {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorCode::FileNotFound,
            ConfigError::InvalidYaml { .. } => ConfigErrorCode::InvalidYaml,
            ConfigError::InvalidValue { .. } => ConfigErrorCode::InvalidValue,
            ConfigError::IoError(_) => ConfigErrorCode::IoError,
        }
    }

    fn hints(&self) -> Vec<String> {
        match self {
            ConfigError::FileNotFound { .. } => vec![
                "Pass the right file with --config".to_string(),
                "Run `pacsweb init-config` to write the default one".to_string(),
            ],
            ConfigError::InvalidYaml { .. } => {
                vec!["Compare with the output of `pacsweb init-config`".to_string()]
            }
            ConfigError::InvalidValue { .. } | ConfigError::IoError(_) => vec![],
        }
    }

    pub fn to_details(&self) -> ConfigErrorDetails {
        let field = match self {
            ConfigError::InvalidValue { field, .. } => Some(field.clone()),
            _ => None,
        };
        ConfigErrorDetails {
            code: self.code(),
            message: self.to_string(),
            field,
            hints: self.hints(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_details() {
        let err = ConfigError::InvalidValue {
            field: "server.host".to_string(),
            reason: "Host must be an http(s) URL".to_string(),
        };
        let details = err.to_details();
        assert_eq!(details.code, ConfigErrorCode::InvalidValue);
        assert_eq!(
            details.to_string(),
            "[INVALID_VALUE] Invalid value for server.host: Host must be an http(s) URL (server.host)"
        );
    }

    #[test]
    fn test_missing_file_hints() {
        let err = ConfigError::FileNotFound {
            path: "nope.yaml".to_string(),
        };
        let rendered = err.to_details().to_string();
        assert!(rendered.starts_with("[FILE_NOT_FOUND] Config file not found: nope.yaml"));
        assert!(rendered.contains("hint: Run `pacsweb init-config`"));
    }
}
