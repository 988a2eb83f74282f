//! Shared HTTP plumbing

pub mod upload;
pub mod validated_json;

pub use upload::{JsonOrMultipart, UploadedFile};
pub use validated_json::ValidatedJson;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::domain::DomainError;

/// Error envelope every handler returns on failure.
///
/// Wire format is `{"error": "<human string>"}` with the status from the
/// domain taxonomy; unexpected 5xx bodies stay generic and the detail
/// goes to the server log.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!("internal error: {}", self.0);
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn business_error_keeps_its_code() {
        let response = ApiError(DomainError::InsufficientSeats).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "INSUFFICIENT_SEATS");
    }

    #[tokio::test]
    async fn database_error_body_is_generic() {
        let response = ApiError(DomainError::Database("secret dsn".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal server error");
    }

    #[tokio::test]
    async fn conflict_maps_to_409() {
        let response = ApiError(DomainError::DuplicateReservation).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
