//! Target URL parsing.

use axum::http::HeaderValue;
use url::Url;

/// A validated, absolute forwarding target.
#[derive(Debug, Clone)]
pub struct Target {
    url: Url,
    host: HeaderValue,
}

impl Target {
    /// Parse the raw `url` query value.
    ///
    /// Returns `None` for anything that is not an absolute URL with a host
    /// (`not-a-url`, `/relative`, `mailto:x@y`, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        Self::from_url(Url::parse(raw).ok()?)
    }

    /// Wrap an already-parsed URL, e.g. a resolved redirect `Location`.
    pub fn from_url(url: Url) -> Option<Self> {
        // Host-less URLs (`mailto:`, `file:///x`) parse, but there is no Host
        // to forward, so they are rejected here with 400 rather than at fetch.
        let host = url.host_str()?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let host = HeaderValue::from_str(&authority).ok()?;
        Some(Self { url, host })
    }

    /// The full target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Value for the forwarded `Host` header (`host[:port]`, default port
    /// omitted).
    pub fn host_header(&self) -> &HeaderValue {
        &self.host
    }
}
