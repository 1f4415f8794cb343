//! Error responses for the EDDI HTTP API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::error;

use crate::error::ServerError;

/// API error type rendered as a standard JSON body
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),
    /// Not found (404)
    NotFound(String),
    /// Upstream failure (502)
    BadGateway(String),
    /// Internal server error (500)
    InternalServerError(String),
}

impl From<ServerError> for ApiError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ServerError::ValidationError(_) => ApiError::BadRequest(err.to_string()),
            ServerError::DialogueError(_) => ApiError::BadGateway(err.to_string()),
            ServerError::CatalogError(_)
            | ServerError::ConfigError(_)
            | ServerError::InternalError(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::BadGateway(msg) => write!(f, "Bad Gateway: {}", msg),
            ApiError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, &str) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "ERR_BAD_REQUEST", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "ERR_NOT_FOUND", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "ERR_DIALOGUE_MANAGER", msg),
            ApiError::InternalServerError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "ERR_INTERNAL_SERVER_ERROR", msg)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code, message) = self.parts();
        if status.is_server_error() {
            error!(status = %status, error = %message, "Request failed");
        }

        let body = Json(json!({
            "error": message,
            "detail": message,
            "errorDetails": {
                "errorCode": error_code,
                "errorMessage": message,
            }
        }));

        (status, body).into_response()
    }
}
