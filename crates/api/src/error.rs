//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, ApiError>`. Errors are rendered as a JSON
//! body of the form:
//!
//! ```json
//! {"code": "invalid_params", "message": "User data is required.", "data": {"status": 400}}
//! ```
//!
//! Server errors are captured to Sentry with their underlying cause before the
//! response is built; the client only sees a fixed message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use multiship_core::{AddressId, CodecError};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type for the address API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required parameter is missing or malformed.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The referenced address does not exist.
    #[error("Shipping address {0} not found")]
    NotFound(AddressId),

    /// The store did not report a generated id for a new address.
    #[error("Insert failed: {0}")]
    InsertFailed(String),

    /// The store did not report the address as updated.
    #[error("Update failed: {0}")]
    UpdateFailed(String),

    /// A stored payload could not be decoded.
    #[error("Data integrity error for address {id}: {source}")]
    DataIntegrity {
        id: AddressId,
        #[source]
        source: CodecError,
    },

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// The request path does not match any route.
    #[error("No route matched")]
    NoRoute,
}

/// Structured error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    data: ErrorData,
}

#[derive(Debug, Serialize)]
struct ErrorData {
    status: u16,
}

impl ApiError {
    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameters(_) => "invalid_params",
            Self::NotFound(_) => "shipping_address_not_found",
            Self::InsertFailed(_) => "insert_failed",
            Self::UpdateFailed(_) => "update_failed",
            Self::DataIntegrity { .. } => "data_integrity_error",
            Self::Database(_) => "database_error",
            Self::NoRoute => "rest_no_route",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidParameters(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::NoRoute => StatusCode::NOT_FOUND,
            Self::InsertFailed(_)
            | Self::UpdateFailed(_)
            | Self::DataIntegrity { .. }
            | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client.
    ///
    /// Server errors get a fixed message so internal details never leak.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidParameters(message) => message.clone(),
            Self::NotFound(_) => "Shipping address not found.".to_string(),
            Self::InsertFailed(_) => "Failed to create shipping address.".to_string(),
            Self::UpdateFailed(_) => "Failed to update shipping address.".to_string(),
            Self::DataIntegrity { .. } => {
                "Stored shipping address could not be decoded.".to_string()
            }
            Self::Database(_) => "Internal server error".to_string(),
            Self::NoRoute => "No route was found matching the URL and request method.".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                code = self.code(),
                sentry_event_id = %event_id,
                "Address request error"
            );
        }

        let body = ErrorBody {
            code: self.code(),
            message: self.client_message(),
            data: ErrorData {
                status: status.as_u16(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound(AddressId::new(12));
        assert_eq!(err.to_string(), "Shipping address 12 not found");

        let err = ApiError::InvalidParameters("User data is required.".to_string());
        assert_eq!(err.to_string(), "Invalid parameters: User data is required.");
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::InvalidParameters("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound(AddressId::new(1)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::NoRoute.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::InsertFailed("x".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::UpdateFailed("x".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::DataIntegrity {
                id: AddressId::new(1),
                source: CodecError::UnsupportedVersion(9),
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_client_error_body_carries_message() {
        let (status, body) =
            body_json(ApiError::InvalidParameters("User data is required.".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_params");
        assert_eq!(body["message"], "User data is required.");
        assert_eq!(body["data"]["status"], 400);
    }

    #[tokio::test]
    async fn test_server_error_body_hides_cause() {
        let (status, body) = body_json(ApiError::InsertFailed(
            "duplicate key value violates unique constraint".to_string(),
        ))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "insert_failed");
        assert_eq!(body["message"], "Failed to create shipping address.");
        assert_eq!(body["data"]["status"], 500);
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let (status, body) = body_json(ApiError::NotFound(AddressId::new(3))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "shipping_address_not_found");
        assert_eq!(body["message"], "Shipping address not found.");
    }
}
