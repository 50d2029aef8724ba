//! Shared utilities for integration testing.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, Response, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use egress_gateway::{GatewayConfig, GatewayServer, Shutdown};

pub const SECRET: &str = "test-secret";
pub const VERSION: &str = "9.9.9-test";

/// Payload served by `/large`.
pub fn large_body() -> Vec<u8> {
    (0..256 * 1024).map(|i| (i % 251) as u8).collect()
}

/// A running mock origin.
pub struct Origin {
    pub addr: SocketAddr,
    /// Hits on `/counter`.
    pub hits: Arc<AtomicUsize>,
}

impl Origin {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a mock origin with a handful of fixed routes.
pub async fn start_origin() -> Origin {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter_hits = hits.clone();

    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            "/rate-limited",
            get(|| async {
                Response::builder()
                    .status(StatusCode::TOO_MANY_REQUESTS)
                    .header(header::RETRY_AFTER, "120")
                    .header(header::CONTENT_TYPE, "text/plain")
                    .body(Body::from("slow down"))
                    .unwrap()
            }),
        )
        .route(
            "/echo",
            get(|uri: Uri, headers: HeaderMap| async move {
                let mut seen = BTreeMap::new();
                for (name, value) in headers.iter() {
                    seen.insert(name.to_string(), value.to_str().unwrap_or_default().to_string());
                }
                Json(serde_json::json!({
                    "uri": uri.to_string(),
                    "headers": seen,
                }))
            }),
        )
        .route(
            "/moved",
            get(|| async {
                Response::builder()
                    .status(StatusCode::FOUND)
                    .header(header::LOCATION, "/echo?from=moved")
                    .body(Body::empty())
                    .unwrap()
            }),
        )
        .route(
            "/untyped",
            get(|| async { Response::new(Body::from("raw bytes")) }),
        )
        .route(
            "/large",
            get(|| async {
                Response::builder()
                    .header(header::CONTENT_TYPE, "application/x-test")
                    .body(Body::from(large_body()))
                    .unwrap()
            }),
        )
        .route(
            "/counter",
            get(move || {
                let hits = counter_hits.clone();
                async move {
                    let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
                    format!("hit {}", n)
                }
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Origin { addr, hits }
}

/// Start an origin that answers every path with `302 Found`.
///
/// `location` of `None` points the redirect back at the redirector itself.
#[allow(dead_code)]
pub async fn start_redirector(location: Option<String>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let location = location.unwrap_or_else(|| format!("http://{}/again", addr));

    let app = Router::new().fallback(move || {
        let location = location.clone();
        async move {
            Response::builder()
                .status(StatusCode::FOUND)
                .header(header::LOCATION, location)
                .body(Body::empty())
                .unwrap()
        }
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// Start a backend that answers every connection with the same raw bytes.
#[allow(dead_code)]
pub async fn start_raw_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        // Drain the request head before replying
                        let mut head = Vec::new();
                        let mut buf = [0u8; 1024];
                        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => head.extend_from_slice(&buf[..n]),
                            }
                        }
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Config used by the tests: fixed secret and version, no system proxy.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::with_secret(SECRET);
    config.version = VERSION.to_string();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.system_proxy = false;
    config
}

/// A running gateway. Shuts down when dropped.
pub struct Gateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Gateway {
    /// Proxy-path URL for `target`, with optional extra query.
    pub fn proxy_url(&self, target: &str, extra: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
        format!("http://{}/?url={}{}", self.addr, encoded, extra)
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_gateway(config: GatewayConfig) -> Gateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Gateway { addr, shutdown }
}

/// Client that never goes through an environment proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}
