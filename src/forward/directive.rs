//! Edge-caching directive derived from the `cacheTtl` query parameter.

/// Cache the upstream response for `ttl_secs`, ignoring the origin's own
/// cacheability headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheDirective {
    pub ttl_secs: u64,
    pub cache_everything: bool,
}

impl CacheDirective {
    /// Parse a raw `cacheTtl` value.
    ///
    /// Anything that is not a strictly positive integer yields `None`; an
    /// invalid value means "no caching", never an error.
    pub fn from_param(raw: Option<&str>) -> Option<Self> {
        let ttl: i64 = raw?.trim().parse().ok()?;
        if ttl <= 0 {
            return None;
        }
        Some(Self {
            ttl_secs: ttl as u64,
            cache_everything: true,
        })
    }
}
