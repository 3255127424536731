use async_trait::async_trait;
use stockcheck_core::{BrandSet, Ingredient};

use crate::error::StoreError;

/// One product title as it appeared on a store's result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResultItem {
    title: String,
}

impl RawResultItem {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Capability set every store integration provides.
///
/// An adapter owns one navigation session for the duration of a store run.
/// The resolver calls `open_search_surface` once, then `search` and
/// `fetch_result_titles` per ingredient, and `shutdown` on every exit path.
#[async_trait]
pub trait StoreAdapter: Send {
    /// Stable store identifier used as the matrix key.
    fn store_id(&self) -> &str;

    /// Brings the store's search entry point to an interactive state.
    ///
    /// # Errors
    ///
    /// [`StoreError::Navigation`] if the entry point is not usable within the
    /// bounded wait.
    async fn open_search_surface(&mut self) -> Result<(), StoreError>;

    /// Replaces any prior query text with `ingredient` and submits it. The
    /// surface stays reusable for the next query without re-opening.
    ///
    /// # Errors
    ///
    /// [`StoreError::Navigation`] if the search surface has become unusable.
    async fn search(&mut self, ingredient: &Ingredient) -> Result<(), StoreError>;

    /// Reads the titles of the current result page.
    ///
    /// # Errors
    ///
    /// [`StoreError::NoResults`] if the result container never appears, or
    /// [`StoreError::Navigation`] if the page cannot be read at all.
    async fn fetch_result_titles(&mut self) -> Result<Vec<RawResultItem>, StoreError>;

    /// Enumerates the store's own brand names. Best effort.
    ///
    /// # Errors
    ///
    /// [`StoreError::BrandLookup`] on any failure; callers treat it as an
    /// empty set.
    async fn fetch_brand_set(&mut self) -> Result<BrandSet, StoreError>;

    /// Releases the navigation session. Must tolerate being called after a
    /// failed open.
    async fn shutdown(&mut self);
}
