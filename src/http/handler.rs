//! Proxy request handler.
//!
//! Straight-line sequence of gates, each returning early with a
//! [`ProxyError`]:
//!
//! ```text
//! method → secret → url present → url valid → dispatch → compose
//! ```

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    response::{IntoResponse, Response},
};
use url::form_urlencoded;

use crate::forward::{forward_headers, upstream::describe_error, CacheDirective, Target};
use crate::http::response::{compose, ProxyError};
use crate::http::server::GatewayState;
use crate::observability::metrics;
use crate::security::is_authorized;

/// Query parameters understood on the proxy path.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProxyParams {
    pub url: Option<String>,
    pub cache_ttl: Option<String>,
}

impl ProxyParams {
    /// Decode the query string. The first occurrence of a key wins and an
    /// empty `url` counts as missing.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(query) = query else {
            return params;
        };
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "url" if params.url.is_none() && !value.is_empty() => {
                    params.url = Some(value.into_owned());
                }
                "cacheTtl" if params.cache_ttl.is_none() => {
                    params.cache_ttl = Some(value.into_owned());
                }
                _ => {}
            }
        }
        params
    }
}

/// Main proxy handler.
pub async fn proxy_handler(
    State(state): State<GatewayState>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();

    match forward(&state, request).await {
        Ok(response) => {
            metrics::record_request("forwarded", response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            metrics::record_request(e.kind(), e.status().as_u16(), start_time);
            e.into_response()
        }
    }
}

async fn forward(state: &GatewayState, request: Request<Body>) -> Result<Response, ProxyError> {
    let (parts, _body) = request.into_parts();

    if parts.method != Method::GET {
        tracing::debug!(method = %parts.method, "Rejected non-GET proxy request");
        return Err(ProxyError::MethodNotAllowed);
    }

    if !is_authorized(&parts.headers, &state.config.secret) {
        tracing::warn!(path = %parts.uri.path(), "Rejected request with missing or wrong secret");
        return Err(ProxyError::Unauthorized);
    }

    let params = ProxyParams::from_query(parts.uri.query());
    let raw_target = params.url.ok_or(ProxyError::MissingUrl)?;
    let target = Target::parse(&raw_target).ok_or_else(|| {
        tracing::debug!(target_url = %raw_target, "Rejected unparseable target");
        ProxyError::InvalidTarget
    })?;

    let headers = forward_headers(&parts.headers, target.host_header());
    let directive = CacheDirective::from_param(params.cache_ttl.as_deref());

    tracing::debug!(
        target_url = %target.url(),
        cache_ttl = directive.map(|d| d.ttl_secs),
        "Forwarding request"
    );

    let upstream = state
        .upstream
        .fetch(target, headers, directive)
        .await
        .map_err(|e| {
            let message = describe_error(&e);
            tracing::error!(target_url = %raw_target, error = %message, "Upstream error");
            ProxyError::Upstream(message)
        })?;

    Ok(compose(upstream, directive, &state.version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_from_query() {
        let params = ProxyParams::from_query(Some(
            "url=https%3A%2F%2Fapi.example.com%2Fv1%3Fa%3D1%26b%3D2&cacheTtl=60",
        ));
        assert_eq!(params.url.as_deref(), Some("https://api.example.com/v1?a=1&b=2"));
        assert_eq!(params.cache_ttl.as_deref(), Some("60"));
    }

    #[test]
    fn test_params_first_wins() {
        let params = ProxyParams::from_query(Some("url=http://a/&url=http://b/"));
        assert_eq!(params.url.as_deref(), Some("http://a/"));
    }

    #[test]
    fn test_params_missing() {
        assert_eq!(ProxyParams::from_query(None), ProxyParams::default());
        assert_eq!(ProxyParams::from_query(Some("url=")), ProxyParams::default());
        assert_eq!(ProxyParams::from_query(Some("other=1")).url, None);
    }
}
