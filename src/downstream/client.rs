//! HTTP client for the grade calculation endpoint.
//!
//! # Responsibilities
//! - Forward a Student as JSON to the configured endpoint
//! - Propagate the inbound request ID
//! - Enforce the downstream deadline and response size cap
//! - Decode the response into a GradesResult

use arc_swap::ArcSwap;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Method, Request, Response, Uri};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::DownstreamConfig;
use crate::downstream::types::DownstreamError;
use crate::grades::{GradesResult, Student};
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;

/// Resolved settings for one downstream configuration.
struct Target {
    config: DownstreamConfig,
    endpoint: Uri,
    client: Client<HttpConnector, Body>,
}

impl Target {
    fn build(config: DownstreamConfig) -> Result<Self, DownstreamError> {
        let endpoint_str = config.endpoint();
        let endpoint: Uri = endpoint_str
            .parse()
            .map_err(|_| DownstreamError::InvalidEndpoint(endpoint_str))?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    async fn exchange(
        &self,
        student: &Student,
        request_id: Option<&str>,
    ) -> Result<GradesResult, DownstreamError> {
        let payload = serde_json::to_vec(student).map_err(DownstreamError::Encode)?;

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");

        if let Some(id) = request_id.and_then(|id| HeaderValue::from_str(id).ok()) {
            builder = builder.header(X_REQUEST_ID, id);
        }

        let request = builder.body(Body::from(payload))?;
        let response = self.client.request(request).await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, endpoint = %self.endpoint, "Downstream returned error status");
            return Err(DownstreamError::Status(status));
        }

        let body = read_body(response, self.config.max_response_bytes).await?;
        GradesResult::from_json(&body).map_err(DownstreamError::Decode)
    }
}

async fn read_body(response: Response<Incoming>, limit: usize) -> Result<Bytes, DownstreamError> {
    axum::body::to_bytes(Body::new(response.into_body()), limit)
        .await
        .map_err(DownstreamError::Body)
}

/// Client for the data aggregation service.
///
/// Cheap to share behind an `Arc`; the target can be swapped with
/// [`DownstreamClient::reload`] while requests are in flight.
pub struct DownstreamClient {
    target: ArcSwap<Target>,
}

impl DownstreamClient {
    /// Create a client for the given downstream configuration.
    pub fn new(config: DownstreamConfig) -> Result<Self, DownstreamError> {
        let target = Target::build(config)?;
        Ok(Self {
            target: ArcSwap::from_pointee(target),
        })
    }

    /// Replace the downstream target. In-flight calls keep their old target.
    pub fn reload(&self, config: DownstreamConfig) -> Result<(), DownstreamError> {
        let target = Target::build(config)?;
        tracing::info!(endpoint = %target.endpoint, "Downstream target updated");
        self.target.store(Arc::new(target));
        Ok(())
    }

    /// Current endpoint URL.
    pub fn endpoint(&self) -> String {
        self.target.load().endpoint.to_string()
    }

    /// Send a student to the service and decode the grade summary.
    pub async fn calculate_grades(
        &self,
        student: &Student,
        request_id: Option<&str>,
    ) -> Result<GradesResult, DownstreamError> {
        let target = self.target.load_full();
        let deadline = target.config.timeout_secs;
        let start = Instant::now();

        tracing::debug!(
            request_id = request_id.unwrap_or("unknown"),
            endpoint = %target.endpoint,
            "Forwarding student to data aggregation service"
        );

        let result = tokio::time::timeout(
            Duration::from_secs(deadline),
            target.exchange(student, request_id),
        )
        .await
        .unwrap_or(Err(DownstreamError::Timeout(deadline)));

        match &result {
            Ok(_) => metrics::record_downstream("success", start),
            Err(e) => metrics::record_downstream(e.kind(), start),
        }

        result
    }
}
