//! Edge cache subsystem.
//!
//! # Data Flow
//! ```text
//! Request with cacheTtl > 0:
//!     → store.rs lookup by target URL
//!         hit  → replay stored status, headers, body
//!         miss → forward upstream
//!                → tee.rs copies the body while it streams to the caller
//!                → on clean end of stream, store.rs inserts for ttl
//! ```
//!
//! # Design Decisions
//! - Cache-everything: the origin's Cache-Control is not consulted
//! - Only 2xx responses are stored
//! - Storing never buffers the caller's response
//! - Expiry is lazy (on lookup, and on insert when full)

pub mod store;
pub mod tee;

pub use store::{CachedResponse, EdgeCache};
pub use tee::TeeStream;
