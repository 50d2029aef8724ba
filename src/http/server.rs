//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health and proxy handlers
//! - Wire up middleware (tracing)
//! - Build the shared outbound client and edge cache
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{http::HeaderValue, routing::any, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::forward::Upstream;
use crate::http::handler::proxy_handler;
use crate::http::health::get_health;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<GatewayConfig>,
    pub upstream: Upstream,
    /// `config.version` pre-rendered for `X-Proxy-Version`.
    pub version: HeaderValue,
}

impl GatewayState {
    pub fn new(config: GatewayConfig, upstream: Upstream) -> Self {
        let version = HeaderValue::from_str(&config.version).unwrap_or_else(|_| {
            tracing::warn!(version = %config.version, "Version is not a valid header value");
            HeaderValue::from_static("unknown")
        });
        Self {
            config: Arc::new(config),
            upstream,
            version,
        }
    }
}

/// Error type for server startup.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for the forwarding gateway.
pub struct GatewayServer {
    router: Router,
    state: GatewayState,
}

impl GatewayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let upstream = Upstream::from_config(&config)?;
        Ok(Self::with_upstream(config, upstream))
    }

    /// Create a server around an already-built upstream.
    pub fn with_upstream(config: GatewayConfig, upstream: Upstream) -> Self {
        let state = GatewayState::new(config, upstream);
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: GatewayState) -> Router {
        Router::new()
            .route("/health", any(get_health))
            .route("/version", any(get_health))
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &GatewayState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            version = %self.state.config.version,
            edge_cache = self.state.upstream.cache().is_some(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
