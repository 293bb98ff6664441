//! Server error type, mapped to an HTTP response body `{error, status}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum ServerError {
    EngineError(String),
    InvalidRequest(String),
    InternalError(String),
    NotFound(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::EngineError(msg) => write!(f, "engine error: {}", msg),
            ServerError::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            ServerError::InternalError(msg) => write!(f, "internal error: {}", msg),
            ServerError::NotFound(msg) => write!(f, "not found: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ServerError::EngineError(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ServerError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<orca_engine::EngineError> for ServerError {
    fn from(err: orca_engine::EngineError) -> Self {
        match err {
            orca_engine::EngineError::Validation(msg) => ServerError::InvalidRequest(msg),
            other => ServerError::EngineError(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_bad_request() {
        let response = ServerError::from(orca_engine::EngineError::Validation("bad cart_total".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = ServerError::NotFound("receipt missing".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
