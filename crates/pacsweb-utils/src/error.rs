//! Error types for pacsweb-utils

use thiserror::Error;

/// Result type alias for utils operations.
pub type Result<T> = std::result::Result<T, UtilsError>;

#[derive(Debug, Error)]
pub enum UtilsError {
    /// Reading or writing the storage file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key derivation or encryption failed
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// The ciphertext could not be decrypted (wrong password or corrupted data)
    #[error("Failed to decrypt token")]
    Decryption,

    /// Storage lock poisoned
    #[error("Storage error: {0}")]
    Storage(String),
}

impl UtilsError {
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }
}
