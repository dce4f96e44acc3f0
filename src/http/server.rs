//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Bind server to listener
//! - Apply downstream config reloads while serving
//! - Stop gracefully on shutdown

use axum::{
    body::Body,
    extract::Request,
    http,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::Span;

use crate::config::RelayConfig;
use crate::downstream::{DownstreamClient, DownstreamError};
use crate::http::health::health;
use crate::http::request::{request_id_of, UuidRequestId};
use crate::http::student::submit_student;
use crate::lifecycle::shutdown::wait_for;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub downstream: Arc<DownstreamClient>,
}

/// HTTP server for the grade relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
    downstream: Arc<DownstreamClient>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, DownstreamError> {
        let downstream = Arc::new(DownstreamClient::new(config.downstream.clone())?);

        let state = AppState {
            downstream: downstream.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            downstream,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route("/student", post(submit_student))
            .route("/health", get(health))
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(request_span))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs received on `config_updates` retarget the downstream client.
    /// Returns once `shutdown` fires and in-flight requests have drained.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<RelayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            downstream = %self.downstream.endpoint(),
            "HTTP server starting"
        );

        tokio::spawn(apply_config_updates(
            self.downstream.clone(),
            self.config.clone(),
            config_updates,
            shutdown.resubscribe(),
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn request_span(request: &http::Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id_of(request),
        method = %request.method(),
        path = %request.uri().path(),
    )
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let response = next.run(request).await;

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

async fn apply_config_updates(
    downstream: Arc<DownstreamClient>,
    mut current: RelayConfig,
    mut updates: mpsc::UnboundedReceiver<RelayConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(new_config) = update else { break };

                if new_config.downstream != current.downstream {
                    match downstream.reload(new_config.downstream.clone()) {
                        Ok(()) => current.downstream = new_config.downstream.clone(),
                        Err(e) => tracing::error!(error = %e, "Rejected downstream reload"),
                    }
                }

                let pending = take_restart_sections(&mut current, &new_config);
                if !pending.is_empty() {
                    tracing::warn!(
                        sections = ?pending,
                        "Config sections changed; they take effect after restart"
                    );
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

/// Names the sections that differ between `current` and `new_config` and can
/// only be applied by a restart, then records them in `current` so the same
/// change is reported once.
fn take_restart_sections(current: &mut RelayConfig, new_config: &RelayConfig) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if new_config.listener != current.listener {
        current.listener = new_config.listener.clone();
        changed.push("listener");
    }
    if new_config.timeouts != current.timeouts {
        current.timeouts = new_config.timeouts.clone();
        changed.push("timeouts");
    }
    if new_config.limits != current.limits {
        current.limits = new_config.limits.clone();
        changed.push("limits");
    }
    if new_config.observability != current.observability {
        current.observability = new_config.observability.clone();
        changed.push("observability");
    }
    changed
}
