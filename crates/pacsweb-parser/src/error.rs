//! Error types for pacsweb-parser

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid json!")]
    InvalidJson,

    #[error("Validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("Invalid exchange rates payload: {message}")]
    InvalidRates { message: String },

    #[error("IO error")]
    IoError(#[from] io::Error),
}

impl ParseError {
    /// All user-facing messages carried by this error
    pub fn messages(&self) -> Vec<String> {
        match self {
            ParseError::Validation { errors } => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

impl From<Vec<String>> for ParseError {
    fn from(errors: Vec<String>) -> Self {
        if errors.len() == 1 && errors[0] == "Invalid json!" {
            return ParseError::InvalidJson;
        }
        ParseError::Validation { errors }
    }
}
