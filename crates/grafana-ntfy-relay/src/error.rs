// Numan Thabit 2025
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Reasons a webhook is rejected before any notification is built.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("missing or invalid bearer token")]
    Unauthorized,
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::InvalidJson(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Label used for the `outcome` metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::Unauthorized => "unauthorized",
            RelayError::MethodNotAllowed(_) => "method_not_allowed",
            RelayError::InvalidJson(_) => "invalid_json",
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            RelayError::Unauthorized => "Unauthorized",
            RelayError::MethodNotAllowed(_) => "Method Not Allowed",
            RelayError::InvalidJson(_) => "Invalid JSON",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid push endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("invalid {name} header value")]
    Header { name: &'static str },
    #[error("push request failed: {0}")]
    Request(#[from] reqwest::Error),
}
