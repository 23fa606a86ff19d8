//! HTTP service hosting trust-protected internal routes.
//!
//! `/health` is open. Everything under `/internal` sits behind the
//! [`TrustLayer`].

use crate::domain::config::{ConfigError, TrustConfig};
use crate::gate::TrustGate;
use crate::middleware::{TracingLayer, TrustLayer};
use axum::{extract::State, routing::get, Json, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::info;

/// Service startup and runtime errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wrap `routes` so every request must pass `gate`.
pub fn protect(routes: Router, gate: TrustGate) -> Router {
    routes.layer(
        ServiceBuilder::new()
            .layer(TracingLayer::new())
            .layer(TrustLayer::new(gate)),
    )
}

/// Internal HTTP service
pub struct InternalService {
    gate: TrustGate,
    addr: SocketAddr,
}

impl InternalService {
    /// Build from config; keys are loaded and checked here, before binding.
    pub fn from_config(config: &TrustConfig, addr: SocketAddr) -> Result<Self, ServiceError> {
        Ok(Self::new(TrustGate::from_config(config)?, addr))
    }

    pub fn new(gate: TrustGate, addr: SocketAddr) -> Self {
        Self { gate, addr }
    }

    pub fn gate(&self) -> &TrustGate {
        &self.gate
    }

    /// Full router: open health check plus protected internal routes.
    pub fn router(&self) -> Router {
        let internal = Router::new()
            .route("/ping", get(ping))
            .route("/metrics", get(metrics))
            .with_state(Arc::new(self.gate.clone()));

        Router::new()
            .route("/health", get(health_check))
            .nest("/internal", protect(internal, self.gate.clone()))
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServiceError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServiceError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        info!(addr = %listener.local_addr()?, "internal service listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("internal service stopped");
        Ok(())
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": crate::VERSION,
    }))
}

async fn ping() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "code": 200,
        "message": "pong",
        "data": {},
    }))
}

async fn metrics(State(gate): State<Arc<TrustGate>>) -> Json<serde_json::Value> {
    Json(gate.metrics().to_json())
}
