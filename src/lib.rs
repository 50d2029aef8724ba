//! Authenticated HTTP forwarding gateway.
//!
//! A caller sends `GET /?url=<target>` with the shared secret in
//! `X-Proxy-Secret`; the gateway fetches the target from its own network
//! egress and streams the answer back. `/health` and `/version` report the
//! configured version without authentication.
//!
//! There is deliberately no host allow-list: the shared secret is the only
//! access control.

pub mod cache;
pub mod config;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
