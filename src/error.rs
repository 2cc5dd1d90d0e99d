use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

/// Failures surfaced by account, track and profile operations.
///
/// `Storage`, `Io` and `Internal` fail the current request with a 500. Every
/// other variant is a local rejection: the request is refused and nothing was
/// mutated.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Missing, tampered or expired session, or a session for a user that no longer exists.
    #[error("Authentication required")]
    Authentication,

    /// The actor is authenticated but does not own the resource.
    #[error("{0}")]
    Authorization(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    /// Unknown nickname and wrong password are deliberately the same error.
    #[error("Invalid nickname or password")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("File storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            CoreError::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            CoreError::Authorization(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            CoreError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            CoreError::Storage(_) | CoreError::Io(_) | CoreError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            CoreError::Storage(_) | CoreError::Io(_) | CoreError::Internal(_) => {
                error!(error = %self, "Request failed");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
