//! Error types for the Lark client

use thiserror::Error;

/// Lark API errors
#[derive(Debug, Error)]
pub enum LarkError {
    /// Connection error (network, DNS, timeout)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// Status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The API answered with a non-zero `code`
    #[error("Lark API error {code}: {msg}")]
    ApiError {
        /// Lark error code
        code: i64,
        /// Lark error message
        msg: String,
    },

    /// Token could not be obtained
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for LarkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            LarkError::ConnectionError(e.to_string())
        } else if e.is_decode() {
            LarkError::InvalidResponse(e.to_string())
        } else {
            match e.status() {
                Some(status) => LarkError::HttpError {
                    status: status.as_u16(),
                    body: e.to_string(),
                },
                None => LarkError::ConnectionError(e.to_string()),
            }
        }
    }
}

impl From<serde_json::Error> for LarkError {
    fn from(e: serde_json::Error) -> Self {
        LarkError::InvalidResponse(format!("JSON parsing error: {}", e))
    }
}
