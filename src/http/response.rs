//! Error responses.
//!
//! Every relay failure (transport, status, timeout, body, decode) is reported
//! to the caller as a plain `500 Internal Server Error`. The cause is only
//! logged, inside the request span that carries the request ID.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::downstream::DownstreamError;

impl IntoResponse for DownstreamError {
    fn into_response(self) -> Response {
        tracing::error!(kind = self.kind(), error = %self, "Relay to data aggregation service failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
