//! Unified error types for the traffic aggregator.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Unified error type for the traffic aggregator.
#[derive(Error, Debug)]
pub enum AggregatorError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client construction or transport error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a single flow-segment lookup.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// Response body was not the expected JSON.
    #[error("failed to parse flow response: {0}")]
    Parse(String),

    /// Call exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Request(err)
        }
    }
}

/// Errors surfaced to HTTP clients.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A query parameter could not be used.
    #[error("invalid query parameter '{param}' = '{value}': {reason}")]
    InvalidQuery {
        /// Parameter name.
        param: &'static str,
        /// Raw value as received.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidQuery { .. } => "invalid_query",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AggregatorError>;
