use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("record not found: {0}")]
    NotFound(String),
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row".to_string()),
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Failures of the indexing path. These never reach the request that triggered the
/// mutation; the queue logs and counts them.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("employee not found: {0}")]
    EmployeeNotFound(String),

    #[error("invalid indexing request: {0}")]
    InvalidRequest(String),
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Body of every non-2xx response: `{"message": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = match &self {
            SearchError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SearchError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match status {
            StatusCode::BAD_REQUEST => tracing::warn!("Rejected search request: {}", self),
            _ => tracing::error!("Search failed: {}", self),
        }

        (
            status,
            Json(ErrorMessage {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
