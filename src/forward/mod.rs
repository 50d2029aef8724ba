//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Authenticated GET
//!     → target.rs (parse `url`, derive Host value)
//!     → headers.rs (inbound headers - X-Proxy-Secret + Host)
//!     → directive.rs (parse `cacheTtl`)
//!     → upstream.rs (edge cache lookup, single outbound GET)
//!     → UpstreamResponse handed back to the HTTP layer
//! ```

pub mod directive;
pub mod headers;
pub mod target;
pub mod upstream;

pub use directive::CacheDirective;
pub use headers::forward_headers;
pub use target::Target;
pub use upstream::{Upstream, UpstreamError, UpstreamResponse};
