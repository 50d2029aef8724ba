//! Response handling and transformation.
//!
//! # Responsibilities
//! - Map every handler failure to a plain-text status response
//! - Compose the client response from the upstream response
//! - Add the gateway headers (X-Proxied, X-Proxy-Version, X-Cache-TTL)
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Only Content-Type and Retry-After are taken from the upstream headers
//! - Every upstream transport failure is a 502; no finer distinction

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::forward::{CacheDirective, UpstreamResponse};

pub const X_PROXIED: HeaderName = HeaderName::from_static("x-proxied");
pub const X_PROXY_VERSION: HeaderName = HeaderName::from_static("x-proxy-version");
pub const X_CACHE_TTL: HeaderName = HeaderName::from_static("x-cache-ttl");

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Reasons the gateway answers a proxy request itself.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Missing url parameter")]
    MissingUrl,

    #[error("Invalid target URL")]
    InvalidTarget,

    /// Transport failure talking to the target. Carries the rendered error.
    #[error("Proxy error: {0}")]
    Upstream(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProxyError::MissingUrl | ProxyError::InvalidTarget => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::MethodNotAllowed => "method_not_allowed",
            ProxyError::Unauthorized => "unauthorized",
            ProxyError::MissingUrl => "missing_url",
            ProxyError::InvalidTarget => "invalid_target",
            ProxyError::Upstream(_) => "upstream_error",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, self.to_string()).into_response();
        if status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET"));
        }
        response
    }
}

/// Build the client response for a successful upstream call.
pub fn compose(
    upstream: UpstreamResponse,
    directive: Option<CacheDirective>,
    version: &HeaderValue,
) -> Response {
    let UpstreamResponse {
        status,
        reason,
        headers: upstream_headers,
        body,
    } = upstream;

    let mut response = Response::new(body);
    *response.status_mut() = status;
    if let Some(reason) = reason {
        response.extensions_mut().insert(reason);
    }

    let headers = response.headers_mut();
    let content_type = upstream_headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(X_PROXIED, HeaderValue::from_static("true"));
    headers.insert(X_PROXY_VERSION, version.clone());
    if let Some(directive) = directive {
        headers.insert(X_CACHE_TTL, HeaderValue::from(directive.ttl_secs));
    }
    if let Some(retry_after) = upstream_headers.get(header::RETRY_AFTER) {
        headers.insert(header::RETRY_AFTER, retry_after.clone());
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::HeaderMap;

    fn upstream(status: StatusCode, headers: HeaderMap, body: &'static str) -> UpstreamResponse {
        UpstreamResponse {
            status,
            reason: None,
            headers,
            body: Body::from(body),
        }
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(ProxyError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ProxyError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ProxyError::MissingUrl.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::InvalidTarget.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::Upstream("x".into()).status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_upstream_error_body() {
        let response = ProxyError::Upstream("dns error".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "Proxy error: dns error");
    }

    #[test]
    fn test_method_not_allowed_advertises_get() {
        let response = ProxyError::MethodNotAllowed.into_response();
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET");
    }

    #[tokio::test]
    async fn test_compose_defaults() {
        let version = HeaderValue::from_static("1.2.3");
        let response = compose(upstream(StatusCode::OK, HeaderMap::new(), "ok"), None, &version);

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), DEFAULT_CONTENT_TYPE);
        assert_eq!(headers.get(X_PROXIED).unwrap(), "true");
        assert_eq!(headers.get(X_PROXY_VERSION).unwrap(), "1.2.3");
        assert!(headers.get(X_CACHE_TTL).is_none());
        assert!(headers.get(header::RETRY_AFTER).is_none());

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "ok");
    }

    #[test]
    fn test_compose_propagates_selected_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::RETRY_AFTER, HeaderValue::from_static("120"));
        headers.insert(header::SET_COOKIE, HeaderValue::from_static("a=b"));

        let directive = CacheDirective::from_param(Some("3600"));
        let version = HeaderValue::from_static("dev");
        let response = compose(
            upstream(StatusCode::TOO_MANY_REQUESTS, headers, ""),
            directive,
            &version,
        );

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let headers = response.headers();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(header::RETRY_AFTER).unwrap(), "120");
        assert_eq!(headers.get(X_CACHE_TTL).unwrap(), "3600");
        assert!(headers.get(header::SET_COOKIE).is_none());
    }
}
