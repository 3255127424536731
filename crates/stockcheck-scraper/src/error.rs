use thiserror::Error;

/// Failures of the page-navigation collaborator.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("timed out after {waited_ms}ms waiting for {locator}")]
    Timeout { locator: String, waited_ms: u64 },

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid locator \"{locator}\": {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("no page has been loaded")]
    NoPage,

    #[error("navigation session is closed")]
    SessionClosed,
}

impl NavError {
    /// `true` when the awaited page condition was simply never met.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, NavError::Timeout { .. })
    }
}

/// Store-level error taxonomy. Each variant has exactly one recovery action
/// in the resolver.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The search surface is unusable. Ends the store's run.
    #[error("store {store} unreachable: {reason}")]
    Navigation { store: String, reason: String },

    /// The search produced no result elements. Recorded as a negative
    /// decision for that ingredient only.
    #[error("no results from {store} for \"{query}\"")]
    NoResults { store: String, query: String },

    /// Brand enumeration failed. Absorbed into an empty brand set.
    #[error("brand lookup failed for {store}: {reason}")]
    BrandLookup { store: String, reason: String },
}

impl StoreError {
    pub(crate) fn navigation(store: &str, err: impl std::fmt::Display) -> Self {
        StoreError::Navigation {
            store: store.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn brand_lookup(store: &str, err: impl std::fmt::Display) -> Self {
        StoreError::BrandLookup {
            store: store.to_string(),
            reason: err.to_string(),
        }
    }
}
