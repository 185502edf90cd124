use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::auth::errors::AuthError;
use service::ServiceError;
use tracing::{error, warn};

/// JSON error body: `{"error": <title>, "detail": <message>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: impl Into<String>) -> Self {
        Self { status, title, detail: detail.into() }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", detail)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.title, detail = %self.detail, "request failed");
        }
        (self.status, Json(serde_json::json!({"error": self.title, "detail": self.detail}))).into_response()
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => Self::bad_request(msg),
            e if e.is_unauthenticated() => Self::unauthorized(e.to_string()),
            e => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "auth_backend_error", e.to_string()),
        }
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        if e.is_validation() {
            return Self::bad_request(e.to_string());
        }
        match e {
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::Conflict(msg) => Self::new(StatusCode::CONFLICT, "conflict", msg),
            ServiceError::Storage(b) if b.is_client_error() => Self::bad_request(b.to_string()),
            ServiceError::Storage(b) => {
                warn!(error = %b, "blob store failure");
                Self::new(StatusCode::BAD_GATEWAY, "storage_error", b.to_string())
            }
            ServiceError::Auth(a) => a.into(),
            other => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", other.to_string()),
        }
    }
}
