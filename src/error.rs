//! Error types for the cache proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::proxy::TransportError;
use crate::storage::StorageError;

// == Cache Error Enum ==
/// Unified error type for the cache proxy.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A request named a method the codec does not know
    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream call failed; passed through untouched
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The storage medium rejected an operation
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A background task could not be started
    #[error("Runtime error: {0}")]
    Runtime(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::UnknownMethod(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Transport(TransportError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            CacheError::Transport(_) => StatusCode::BAD_GATEWAY,
            CacheError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Runtime(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache proxy.
pub type Result<T> = std::result::Result<T, CacheError>;
