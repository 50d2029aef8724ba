//! Upstream dispatch.
//!
//! # Responsibilities
//! - Issue one GET per inbound request (no retries), following redirects
//! - Honour the edge-caching directive through the in-process cache
//! - Hand back a lazily streamed body
//!
//! # Design Decisions
//! - The reqwest client is built once and shared; it is cheap to clone
//! - No request timeout is applied here; only the connect timeout from config
//! - Dropping the returned body drops the upstream connection
//! - Redirects are followed here, not by reqwest, so every hop gets a `Host`
//!   matching its own URL

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, StatusCode};
use hyper::ext::ReasonPhrase;
use thiserror::Error;
use url::Url;

use crate::cache::{CachedResponse, EdgeCache, TeeStream};
use crate::config::{GatewayConfig, UpstreamConfig};
use crate::forward::directive::CacheDirective;
use crate::forward::target::Target;
use crate::observability::metrics;

/// Redirect hops followed before giving up (reqwest's own default).
pub const MAX_REDIRECTS: usize = 10;

/// Headers dropped when a redirect leaves the original origin.
const CROSS_ORIGIN_SENSITIVE: [header::HeaderName; 4] = [
    header::AUTHORIZATION,
    header::COOKIE,
    header::PROXY_AUTHORIZATION,
    header::WWW_AUTHENTICATE,
];

/// Failure talking to the target.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("too many redirects (stopped after {0})")]
    TooManyRedirects(usize),
}

/// What came back from the target (or from the edge cache on its behalf).
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub reason: Option<ReasonPhrase>,
    pub headers: HeaderMap,
    pub body: Body,
}

impl UpstreamResponse {
    fn from_cached(cached: &CachedResponse) -> Self {
        Self {
            status: cached.status,
            reason: cached.reason.clone(),
            headers: cached.headers.clone(),
            body: Body::from(cached.body.clone()),
        }
    }
}

/// Build the shared outbound client.
pub fn build_client(config: &UpstreamConfig) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.connect_timeout_secs {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }
    if let Some(ua) = &config.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    if !config.system_proxy {
        builder = builder.no_proxy();
    }
    builder.redirect(reqwest::redirect::Policy::none()).build()
}

/// Outbound side of the gateway.
#[derive(Clone)]
pub struct Upstream {
    client: reqwest::Client,
    cache: Option<Arc<EdgeCache>>,
}

impl Upstream {
    pub fn new(client: reqwest::Client, cache: Option<Arc<EdgeCache>>) -> Self {
        Self { client, cache }
    }

    /// Build the client and (if enabled) the edge cache from config.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = build_client(&config.upstream)?;
        let cache = config
            .edge_cache
            .enabled
            .then(|| Arc::new(EdgeCache::new(&config.edge_cache)));
        Ok(Self::new(client, cache))
    }

    pub fn cache(&self) -> Option<&Arc<EdgeCache>> {
        self.cache.as_ref()
    }

    /// Fetch `target` with the derived header set.
    pub async fn fetch(
        &self,
        target: Target,
        headers: HeaderMap,
        directive: Option<CacheDirective>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let cache = directive.and_then(|d| self.cache.clone().map(|c| (d, c)));
        let key = target.url().to_string();

        if let Some((_, cache)) = &cache {
            if let Some(hit) = cache.get(&key) {
                tracing::debug!(target_url = %key, "Edge cache hit");
                metrics::record_cache_lookup("hit");
                return Ok(UpstreamResponse::from_cached(&hit));
            }
            metrics::record_cache_lookup("miss");
        }

        let response = self.send_following_redirects(target, headers).await?;

        let status = response.status();
        let reason = response.extensions().get::<ReasonPhrase>().cloned();
        let headers = response.headers().clone();
        let stream = response.bytes_stream();

        let body = match cache {
            Some((directive, cache)) if status.is_success() => {
                let limit = cache.max_entry_bytes();
                let stored = CachedResponse {
                    status,
                    reason: reason.clone(),
                    headers: headers.clone(),
                    body: Default::default(),
                };
                let ttl = Duration::from_secs(directive.ttl_secs);
                let tee = TeeStream::new(Box::pin(stream), limit, move |bytes| {
                    if cache.insert(key, CachedResponse { body: bytes, ..stored }, ttl) {
                        metrics::record_cache_lookup("store");
                    }
                });
                Body::from_stream(tee)
            }
            _ => Body::from_stream(stream),
        };

        Ok(UpstreamResponse {
            status,
            reason,
            headers,
            body,
        })
    }

    /// Send the GET, following up to [`MAX_REDIRECTS`] hops. `Host` is
    /// re-derived for every hop; credentials are dropped once the chain leaves
    /// the original origin.
    async fn send_following_redirects(
        &self,
        mut target: Target,
        mut headers: HeaderMap,
    ) -> Result<reqwest::Response, UpstreamError> {
        for hop in 0..=MAX_REDIRECTS {
            let response = self
                .client
                .get(target.url().clone())
                .headers(headers.clone())
                .send()
                .await?;

            let Some(next) = redirect_target(&response, target.url()) else {
                return Ok(response);
            };
            if hop == MAX_REDIRECTS {
                break;
            }

            tracing::debug!(
                from = %target.url(),
                to = %next.url(),
                status = %response.status(),
                "Following redirect"
            );
            if !same_origin(target.url(), next.url()) {
                for name in CROSS_ORIGIN_SENSITIVE.iter() {
                    headers.remove(name);
                }
            }
            headers.insert(header::HOST, next.host_header().clone());
            target = next;
        }
        Err(UpstreamError::TooManyRedirects(MAX_REDIRECTS))
    }
}

/// Where a 3xx response points, if it is followable.
///
/// Responses without a usable `Location` (missing, unparsable, host-less,
/// non-HTTP) are handed back to the caller as-is.
fn redirect_target(response: &reqwest::Response, current: &Url) -> Option<Target> {
    match response.status() {
        StatusCode::MOVED_PERMANENTLY
        | StatusCode::FOUND
        | StatusCode::SEE_OTHER
        | StatusCode::TEMPORARY_REDIRECT
        | StatusCode::PERMANENT_REDIRECT => {}
        _ => return None,
    }
    let location = response.headers().get(header::LOCATION)?.to_str().ok()?;
    let next = current.join(location).ok()?;
    if !matches!(next.scheme(), "http" | "https") {
        return None;
    }
    Target::from_url(next)
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

/// Render a transport error with its full source chain.
pub fn describe_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
