//! HAL+JSON response decoding.
//!
//! OpenProject wraps every resource in a HAL document whose `_type` names the
//! resource kind. Failures are reported as a document with `_type: "Error"`,
//! sometimes with a success status code, so the type tag is inspected before
//! the HTTP status.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

/// `_type` of a HAL error document.
pub const ERROR_TYPE: &str = "Error";

/// `_type` of a single work package.
pub const WORK_PACKAGE_TYPE: &str = "WorkPackage";

/// `_type` of a work package collection.
pub const WORK_PACKAGE_COLLECTION_TYPE: &str = "WorkPackageCollection";

/// Longest slice of a non-JSON body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// HAL error document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDocument {
    /// URN identifying the error kind
    #[serde(rename = "errorIdentifier", default)]
    pub error_identifier: String,

    /// Human readable message
    #[serde(default)]
    pub message: String,
}

/// Decode a HAL response body into `T`.
///
/// # Errors
///
/// - [`ApiError::Remote`] when the body is an `Error` document
/// - [`ApiError::HttpError`] when the status is not a success and there is no error document
/// - [`ApiError::UnexpectedResponse`] when `_type` is not `expected_type` or the shape does not match `T`
/// - [`ApiError::JsonError`] when a success response is not JSON at all
pub fn decode<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    expected_type: &str,
) -> Result<T, ApiError> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            return Err(ApiError::HttpError {
                status: status.as_u16(),
                message: truncate(body),
            });
        }
        Err(e) => return Err(ApiError::JsonError(e)),
    };

    let document_type = value.get("_type").and_then(Value::as_str);

    if document_type == Some(ERROR_TYPE) {
        let document: ErrorDocument = serde_json::from_value(value).unwrap_or_default();
        return Err(ApiError::Remote {
            status: status.as_u16(),
            identifier: document.error_identifier,
            message: document.message,
        });
    }

    if !status.is_success() {
        return Err(ApiError::HttpError {
            status: status.as_u16(),
            message: truncate(body),
        });
    }

    match document_type {
        Some(found) if found != expected_type => Err(ApiError::UnexpectedResponse {
            message: format!("expected {expected_type} document, got {found}"),
        }),
        _ => serde_json::from_value(value).map_err(|e| ApiError::UnexpectedResponse {
            message: format!("malformed {expected_type} document: {e}"),
        }),
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
#[path = "hal_tests.rs"]
mod tests;
