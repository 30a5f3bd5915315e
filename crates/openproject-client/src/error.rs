//! Error types for OpenProject API operations.

use thiserror::Error;

/// Errors during OpenProject API operations.
///
/// These errors represent failures when communicating with the OpenProject
/// API, including HAL error envelopes, HTTP errors and parsing failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a HAL `Error` document.
    #[error("OpenProject error {identifier} ({status}): {message}")]
    Remote {
        status: u16,
        identifier: String,
        message: String,
    },

    /// HTTP error response without a HAL error document.
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    /// The response was JSON but not the document type that was expected.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    /// The client could not be constructed from its configuration.
    #[error("Invalid client configuration: {message}")]
    Configuration { message: String },

    /// Failed to parse a JSON response body.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client error (network, TLS, timeout, etc.).
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

impl ApiError {
    /// Check if this error represents a transient condition that may succeed if retried.
    ///
    /// Nothing in this crate retries; the classification is reported in logs so
    /// operators can tell outages apart from rejected payloads.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Remote { status, .. } | Self::HttpError { status, .. } => {
                *status >= 500 || *status == 429
            }
            Self::UnexpectedResponse { .. } => false,
            Self::Configuration { .. } => false,
            Self::JsonError(_) => false,
            Self::HttpClientError(_) => true,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
