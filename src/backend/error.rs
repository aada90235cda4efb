//! Backend Error Types
//!
//! `BackendError` is the error type every backend component returns. It
//! wraps the shared `CoreError` taxonomy and adds the failure modes only
//! the server side can hit (store and serialization errors), and it knows
//! how to render itself as an HTTP response for the JSON API.

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::shared::CoreError;

/// Errors surfaced by backend components and handlers.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Domain failure: missing record or invalid input.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The persistence store rejected or failed an operation.
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Serializing or deserializing data failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BackendError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::Core(CoreError::not_found(entity, id))
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Core(CoreError::validation(field, message))
    }

    /// Map this error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Core(CoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Core(CoreError::Validation { .. }) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BackendError {
    /// Render the error as a JSON body with its status code:
    /// `{"error": "...", "status": 404}`.
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap_or_else(|_| {
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Body::from("Internal Server Error"))
                    .unwrap()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_code_mapping() {
        let not_found = BackendError::not_found("group", Uuid::nil());
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let validation = BackendError::validation("body", "empty");
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);

        let store = BackendError::Store(sqlx::Error::PoolClosed);
        assert_eq!(store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_core_error() {
        let core = CoreError::not_found("profile", Uuid::nil());
        let backend: BackendError = core.clone().into();
        match backend {
            BackendError::Core(inner) => assert_eq!(inner, core),
            _ => panic!("expected Core variant"),
        }
    }
}
