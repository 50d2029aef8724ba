//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming proxy request:
//!     → method gate (handler)
//!     → secret.rs (compare X-Proxy-Secret with configured secret)
//!     → Pass to parameter parsing
//! ```
//!
//! # Design Decisions
//! - Fail closed: a missing or malformed secret header is unauthorized
//! - Constant-time comparison over equal-length input
//! - No host allow-list; the secret is the only access control

pub mod secret;

pub use secret::{is_authorized, X_PROXY_SECRET};
