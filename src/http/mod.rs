//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing layer)
//!     → /health, /version → health.rs
//!     → anything else     → handler.rs (method, secret, params)
//!         → forward:: (headers, cache directive, upstream call)
//!     → response.rs (compose headers or map the error)
//!     → Send to client
//! ```

pub mod handler;
pub mod health;
pub mod response;
pub mod server;

pub use response::ProxyError;
pub use server::{GatewayServer, GatewayState, ServerError};
