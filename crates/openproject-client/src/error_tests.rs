//! Tests for [`ApiError`] classification.

use super::*;

#[test]
fn test_server_side_remote_errors_are_transient() {
    let error = ApiError::Remote {
        status: 503,
        identifier: "urn:openproject-org:api:v3:errors:InternalServerError".to_string(),
        message: "Maintenance".to_string(),
    };
    assert!(error.is_transient());
}

#[test]
fn test_conflict_is_not_transient() {
    let error = ApiError::Remote {
        status: 409,
        identifier: "urn:openproject-org:api:v3:errors:UpdateConflict".to_string(),
        message: "Your changes could not be saved".to_string(),
    };
    assert!(!error.is_transient());
}

#[test]
fn test_rate_limited_http_error_is_transient() {
    let error = ApiError::HttpError {
        status: 429,
        message: "slow down".to_string(),
    };
    assert!(error.is_transient());
}

#[test]
fn test_unexpected_response_is_permanent() {
    let error = ApiError::UnexpectedResponse {
        message: "expected WorkPackage".to_string(),
    };
    assert!(!error.is_transient());
}

#[test]
fn test_remote_error_display_includes_identifier() {
    let error = ApiError::Remote {
        status: 422,
        identifier: "urn:openproject-org:api:v3:errors:PropertyConstraintViolation".to_string(),
        message: "Subject can't be blank.".to_string(),
    };
    let text = error.to_string();
    assert!(text.contains("PropertyConstraintViolation"));
    assert!(text.contains("422"));
    assert!(text.contains("Subject can't be blank."));
}
