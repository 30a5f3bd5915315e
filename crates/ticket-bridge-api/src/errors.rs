//! Error types for the HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ticket_bridge_core::{MappingError, SyncError};
use tracing::{error, warn};

/// Webhook handler errors with HTTP status code mapping
///
/// Responses never carry a body. The helpdesk only looks at the status code,
/// and an unauthenticated caller must not learn why a request was refused.
///
/// - `404 Not Found`: path secret mismatch
/// - `500 Internal Server Error`: unreadable or malformed payload, missing
///   correlation field configuration, or a failed tracker call
#[derive(Debug, thiserror::Error)]
pub enum WebhookHandlerError {
    /// Path secret did not match
    #[error("Unknown webhook path")]
    NotFound,

    /// Body could not be read from the connection
    #[error("Failed to read webhook body: {0}")]
    UnreadableBody(#[source] axum::Error),

    /// Body is not a ticket event
    #[error("Malformed ticket payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// Synchronization aborted
    #[error("Synchronization failed: {0}")]
    SyncFailed(#[from] SyncError),
}

impl WebhookHandlerError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UnreadableBody(_) | Self::MalformedPayload(_) | Self::SyncFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for WebhookHandlerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Self::NotFound => warn!("Rejected webhook request with unknown path"),
            Self::UnreadableBody(e) => error!(error = %e, "Webhook body could not be read"),
            Self::MalformedPayload(e) => error!(error = %e, "Webhook body is not a ticket event"),
            Self::SyncFailed(e) => error!(error = %e, "Ticket synchronization failed"),
        }

        status.into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Invalid mapping table {key}: {source}")]
    Mapping {
        key: String,
        #[source]
        source: MappingError,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
