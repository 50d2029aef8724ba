//! Shared-secret authentication for the proxy path.

use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

/// Header carrying the shared secret. Never forwarded upstream.
pub const X_PROXY_SECRET: &str = "x-proxy-secret";

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check the request's `X-Proxy-Secret` header against the configured secret.
///
/// A missing header, a non-UTF-8 value or a repeated header with a wrong
/// first value all count as unauthorized. An empty configured secret never
/// authorizes anything.
pub fn is_authorized(headers: &HeaderMap, secret: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    headers
        .get(X_PROXY_SECRET)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|provided| constant_time_compare(provided, secret))
}
