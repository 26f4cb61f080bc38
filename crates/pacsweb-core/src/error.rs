//! Error types for pacsweb-core
//!
//! Lookups, tree construction, form validation and local storage all report
//! through [`CoreError`]. Form validation keeps every message so the caller
//! can show them all at once.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Pk;

/// Stable identifier of a [`CoreError`] kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AccountNotFound,
    CurrencyNotFound,
    TransactionNotFound,
    MissingRoot,
    MultipleRoots,
    ValidationError,
    StorageError,
    InvalidFormat,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Reuse the serde name so the two never drift apart.
        match serde_json::to_value(self) {
            Ok(serde_json::Value::String(name)) => f.write_str(&name),
            _ => write!(f, "{:?}", self),
        }
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Account not found: {pk}")]
    AccountNotFound { pk: Pk },

    #[error("Currency not found: {pk}")]
    CurrencyNotFound { pk: Pk },

    #[error("Transaction not found: {pk}")]
    TransactionNotFound { pk: Pk },

    #[error("Missing root account.")]
    MissingRoot,

    #[error("Multiple root accounts.")]
    MultipleRoots,

    /// One or more form validation messages
    #[error("{}", .messages.join("; "))]
    Validation { messages: Vec<String> },

    #[error("Storage error: {0}")]
    Storage(#[from] pacsweb_utils::UtilsError),

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation {
            messages: vec![message.into()],
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::AccountNotFound { .. } => ErrorCode::AccountNotFound,
            CoreError::CurrencyNotFound { .. } => ErrorCode::CurrencyNotFound,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::MissingRoot => ErrorCode::MissingRoot,
            CoreError::MultipleRoots => ErrorCode::MultipleRoots,
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::Storage(_) => ErrorCode::StorageError,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        }
    }

    /// Validation messages, or the error message itself for other errors
    pub fn messages(&self) -> Vec<String> {
        match self {
            CoreError::Validation { messages } => messages.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Something the user can try next, printed under the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CoreError::AccountNotFound { .. } => Some("Run `pacsweb accounts` to list accounts"),
            CoreError::CurrencyNotFound { .. } => {
                Some("Run `pacsweb currencies` to list currencies")
            }
            CoreError::TransactionNotFound { .. } => {
                Some("Run `pacsweb transactions` to list recent transactions")
            }
            CoreError::MissingRoot | CoreError::MultipleRoots => {
                Some("The server must hold exactly one account of type root")
            }
            CoreError::Storage(_) => Some("Check the token store file permissions"),
            CoreError::Validation { .. } | CoreError::InvalidFormat { .. } => None,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
