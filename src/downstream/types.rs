//! Downstream error definitions.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that can occur while calling the data aggregation service.
#[derive(Debug, Error)]
pub enum DownstreamError {
    /// Configured endpoint is not a valid URI.
    #[error("invalid downstream endpoint '{0}'")]
    InvalidEndpoint(String),

    /// Student could not be serialized.
    #[error("failed to encode student: {0}")]
    Encode(#[source] serde_json::Error),

    /// Outbound request could not be built.
    #[error("failed to build downstream request: {0}")]
    InvalidRequest(#[from] axum::http::Error),

    /// Connection or protocol failure.
    #[error("downstream request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    /// No complete response before the deadline.
    #[error("downstream timed out after {0} seconds")]
    Timeout(u64),

    /// Service answered with a non-success status.
    #[error("downstream returned status {0}")]
    Status(StatusCode),

    /// Response body could not be read or exceeded the size cap.
    #[error("failed to read downstream body: {0}")]
    Body(#[source] axum::Error),

    /// Response body is not a grade summary.
    #[error("malformed downstream response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl DownstreamError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DownstreamError::InvalidEndpoint(_) => "invalid_endpoint",
            DownstreamError::Encode(_) => "encode",
            DownstreamError::InvalidRequest(_) => "invalid_request",
            DownstreamError::Transport(_) => "transport",
            DownstreamError::Timeout(_) => "timeout",
            DownstreamError::Status(_) => "status",
            DownstreamError::Body(_) => "body",
            DownstreamError::Decode(_) => "decode",
        }
    }
}
