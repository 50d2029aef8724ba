//! Forward header set derivation.
//!
//! The set sent upstream is rebuilt from scratch rather than edited in
//! place: every inbound header except the shared secret, then `Host`
//! overwritten with the target's host.

use axum::http::{header, HeaderMap, HeaderValue};

use crate::security::X_PROXY_SECRET;

/// Build the header set sent to the target.
pub fn forward_headers(inbound: &HeaderMap, host: &HeaderValue) -> HeaderMap {
    let mut forwarded = HeaderMap::with_capacity(inbound.len() + 1);
    for (name, value) in inbound.iter() {
        // HeaderName is always lowercase, so this is a case-insensitive match
        if name.as_str() == X_PROXY_SECRET {
            continue;
        }
        forwarded.append(name.clone(), value.clone());
    }
    forwarded.insert(header::HOST, host.clone());
    forwarded
}
