//! HTTP server exposing pipeline metrics to Prometheus.

use super::{MetricsRegistry, MetricsSnapshot};
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

/// Errors that can occur while serving metrics.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the metrics server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self::with_port(9090)
    }
}

impl MetricsServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
        }
    }
}

/// Registry plus the most recent snapshot pushed by the capture loop.
pub struct MetricsState {
    registry: MetricsRegistry,
    latest: Option<MetricsSnapshot>,
}

impl MetricsState {
    /// Records a new snapshot from the capture loop.
    pub fn update(&mut self, snapshot: MetricsSnapshot) {
        self.registry.update(&snapshot);
        self.latest = Some(snapshot);
    }

    /// Whether the last reported snapshot had the streamer running.
    pub fn is_streaming(&self) -> bool {
        self.latest.as_ref().is_some_and(|s| s.streaming)
    }
}

type SharedState = Arc<RwLock<MetricsState>>;

/// Serves `/metrics` and `/health` over HTTP.
///
/// `/health` answers 503 until the capture loop reports a running
/// streamer.
pub struct MetricsServer {
    config: MetricsServerConfig,
    state: SharedState,
}

impl MetricsServer {
    pub fn new(config: MetricsServerConfig, registry: MetricsRegistry) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(MetricsState {
                registry,
                latest: None,
            })),
        }
    }

    /// Handle for pushing snapshots from the capture loop.
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Runs the server until the listener fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Metrics server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))
    }
}

async fn metrics_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;

    match state.registry.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain; charset=utf-8")],
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    if state.read().await.is_streaming() {
        (StatusCode::OK, "streaming")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not streaming")
    }
}
