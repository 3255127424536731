use std::time::Duration;

use async_trait::async_trait;
use stockcheck_core::{BrandSet, Ingredient, Locator, SearchPageLayout};

use crate::adapter::{RawResultItem, StoreAdapter};
use crate::error::{NavError, StoreError};
use crate::navigator::{ElementHandle, Navigator};

/// Adapter for stores whose catalog is reached through an on-site search
/// page. Every store-specific detail lives in the [`SearchPageLayout`].
pub struct SearchPageAdapter<N> {
    store_id: String,
    navigator: N,
    layout: SearchPageLayout,
    wait_timeout: Duration,
    static_brands: BrandSet,
    search_input: Option<ElementHandle>,
    last_query: String,
    /// Set when brand lookup navigated away from the search surface.
    left_surface: bool,
}

impl<N: Navigator> SearchPageAdapter<N> {
    #[must_use]
    pub fn new(
        store_id: impl Into<String>,
        navigator: N,
        layout: SearchPageLayout,
        wait_timeout: Duration,
    ) -> Self {
        Self {
            store_id: store_id.into(),
            navigator,
            layout,
            wait_timeout,
            static_brands: BrandSet::new(),
            search_input: None,
            last_query: String::new(),
            left_surface: false,
        }
    }

    /// Brands merged into whatever the brand facet reports.
    #[must_use]
    pub fn with_static_brands(mut self, brands: BrandSet) -> Self {
        self.static_brands = brands;
        self
    }

    fn nav_err(&self, err: &NavError) -> StoreError {
        StoreError::navigation(&self.store_id, err)
    }

    async fn dismiss_overlays(&mut self) {
        for locator in self.layout.dismiss.clone() {
            match self.navigator.wait_until(&locator, self.wait_timeout).await {
                Ok(elements) => {
                    if let Some(first) = elements.first() {
                        if let Err(e) = self.navigator.click(first).await {
                            tracing::debug!(store = %self.store_id, error = %e, "dismiss click failed");
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(store = %self.store_id, %locator, error = %e, "nothing to dismiss");
                }
            }
        }
    }

    async fn reveal_results(&mut self) -> Result<(), StoreError> {
        for locator in self.layout.reveal.clone() {
            match self.navigator.wait_until(&locator, self.wait_timeout).await {
                Ok(elements) => {
                    if let Some(first) = elements.first() {
                        self.navigator
                            .click(first)
                            .await
                            .map_err(|e| self.nav_err(&e))?;
                    }
                }
                Err(e) if e.is_timeout() => {
                    tracing::debug!(store = %self.store_id, %locator, "reveal step absent; skipping");
                }
                Err(e) => return Err(self.nav_err(&e)),
            }
        }
        Ok(())
    }

    async fn read_brand_labels(&mut self, label: &Locator) -> Result<BrandSet, NavError> {
        if let Some(facet) = self.layout.brand_facet.clone() {
            let buttons = self.navigator.wait_until(&facet, self.wait_timeout).await?;
            if let Some(first) = buttons.first() {
                self.left_surface = true;
                self.navigator.click(first).await?;
            }
        }

        let elements = self.navigator.wait_until(label, self.wait_timeout).await?;
        let mut brands = BrandSet::new();
        for element in &elements {
            let text = self.navigator.read_text(element).await?;
            if let Some(brand) = clean_brand_label(&text) {
                brands.insert(&brand);
            }
        }
        Ok(brands)
    }
}

#[async_trait]
impl<N: Navigator> StoreAdapter for SearchPageAdapter<N> {
    fn store_id(&self) -> &str {
        &self.store_id
    }

    async fn open_search_surface(&mut self) -> Result<(), StoreError> {
        self.navigator
            .navigate(&self.layout.entry_url)
            .await
            .map_err(|e| self.nav_err(&e))?;

        self.dismiss_overlays().await;

        let inputs = self
            .navigator
            .wait_until(&self.layout.search_input, self.wait_timeout)
            .await
            .map_err(|e| self.nav_err(&e))?;
        self.search_input = inputs.into_iter().next();
        self.left_surface = false;
        Ok(())
    }

    async fn search(&mut self, ingredient: &Ingredient) -> Result<(), StoreError> {
        if self.left_surface {
            tracing::debug!(store = %self.store_id, "returning to search surface");
            self.open_search_surface().await?;
        }
        let Some(input) = self.search_input.clone() else {
            return Err(StoreError::navigation(
                &self.store_id,
                "search surface is not open",
            ));
        };
        self.last_query = ingredient.as_str().to_string();
        self.navigator
            .type_and_submit(&input, ingredient.as_str())
            .await
            .map_err(|e| self.nav_err(&e))
    }

    async fn fetch_result_titles(&mut self) -> Result<Vec<RawResultItem>, StoreError> {
        self.reveal_results().await?;

        let elements = match self
            .navigator
            .wait_until(&self.layout.result_title, self.wait_timeout)
            .await
        {
            Ok(elements) => elements,
            Err(e) if e.is_timeout() => {
                return Err(StoreError::NoResults {
                    store: self.store_id.clone(),
                    query: self.last_query.clone(),
                })
            }
            Err(e) => return Err(self.nav_err(&e)),
        };

        let mut titles = Vec::with_capacity(elements.len());
        for element in &elements {
            let text = self
                .navigator
                .read_text(element)
                .await
                .map_err(|e| self.nav_err(&e))?;
            if !text.trim().is_empty() {
                titles.push(RawResultItem::new(text));
            }
        }

        if titles.is_empty() {
            return Err(StoreError::NoResults {
                store: self.store_id.clone(),
                query: self.last_query.clone(),
            });
        }
        Ok(titles)
    }

    async fn fetch_brand_set(&mut self) -> Result<BrandSet, StoreError> {
        let mut brands = self.static_brands.clone();
        let Some(label) = self.layout.brand_label.clone() else {
            return Ok(brands);
        };

        let scraped = self
            .read_brand_labels(&label)
            .await
            .map_err(|e| StoreError::brand_lookup(&self.store_id, e))?;
        brands.extend(&scraped);
        Ok(brands)
    }

    async fn shutdown(&mut self) {
        self.search_input = None;
        self.navigator.quit().await;
    }
}

/// Cleans a brand facet label such as `"Trader Joe's (14)"` into
/// `"Trader Joes"`. Returns `None` for labels that clean to nothing.
pub(crate) fn clean_brand_label(label: &str) -> Option<String> {
    let name = label.split('(').next().unwrap_or_default();
    let name: String = name.chars().filter(|c| !matches!(c, '\'' | '\u{2019}')).collect();
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
#[path = "search_page_test.rs"]
mod tests;
