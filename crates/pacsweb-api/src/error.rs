//! Error types for pacsweb-api
//!
//! Failed calls are normalised the same way everywhere: when the server
//! answered with a body, that body is the error; otherwise the error is the
//! fixed [`REQUEST_ERROR_MSG`].

use serde_json::Value;
use thiserror::Error;

/// Shown when a request failed without a usable server payload
pub const REQUEST_ERROR_MSG: &str = "Something went wrong on the request";

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport level failure, no response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be read as the expected type
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered with an error status and a payload
    #[error("Server error ({status}): {}", payload_message(.payload))]
    Server { status: u16, payload: Value },

    /// The server answered with an error status and nothing useful
    #[error("{message}")]
    Request { status: Option<u16>, message: String },

    /// The request was refused client side before being sent
    #[error(transparent)]
    Core(#[from] pacsweb_core::CoreError),

    /// The server payload could not be turned into client data
    #[error(transparent)]
    Parse(#[from] pacsweb_parser::ParseError),

    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),
}

fn payload_message(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ApiError {
    pub fn server(status: u16, payload: Value) -> Self {
        Self::Server { status, payload }
    }

    /// Error carrying the generic fallback message
    pub fn request(status: Option<u16>) -> Self {
        Self::Request {
            status,
            message: REQUEST_ERROR_MSG.to_string(),
        }
    }

    /// What should be shown to the user: the server payload when there is
    /// one, the fallback message for transport failures.
    pub fn user_message(&self) -> Value {
        match self {
            ApiError::Server { payload, .. } => payload.clone(),
            ApiError::Core(err) => Value::from(err.messages()),
            ApiError::Parse(err) => Value::from(err.messages()),
            ApiError::Http(_) | ApiError::Json(_) => Value::from(REQUEST_ERROR_MSG),
            other => Value::from(other.to_string()),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Request { status, .. } => *status,
            ApiError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Builds the error for a non success response from its raw body.
///
/// JSON bodies are kept as JSON, other non blank bodies as a string, and a
/// blank body falls back to [`REQUEST_ERROR_MSG`].
pub fn extract_error_data(status: u16, body: &str) -> ApiError {
    if body.trim().is_empty() {
        return ApiError::request(Some(status));
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) => ApiError::request(Some(status)),
        Ok(payload) => ApiError::server(status, payload),
        Err(_) => ApiError::server(status, Value::String(body.to_string())),
    }
}
