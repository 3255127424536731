use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use stockcheck_core::{BrandSet, Ingredient};

use crate::adapter::{RawResultItem, StoreAdapter};
use crate::error::StoreError;

/// Shortest query word that also matches as a prefix ("hon" finds "honey").
const MIN_PREFIX_LEN: usize = 3;

/// Adapter backed by a pre-fetched catalog file with one product title per
/// line. Blank lines and lines starting with `#` are skipped.
///
/// A search returns every line that shares a word with the query, or that
/// has a word starting with one of the query's words. That is deliberately
/// loose, like a store's own search box; the decider does the real
/// filtering.
#[derive(Debug)]
pub struct CatalogAdapter {
    store_id: String,
    path: PathBuf,
    brands: BrandSet,
    lines: Option<Vec<String>>,
    query: Option<Ingredient>,
}

impl CatalogAdapter {
    #[must_use]
    pub fn new(store_id: impl Into<String>, path: impl Into<PathBuf>, brands: BrandSet) -> Self {
        Self {
            store_id: store_id.into(),
            path: path.into(),
            brands,
            lines: None,
            query: None,
        }
    }
}

#[async_trait]
impl StoreAdapter for CatalogAdapter {
    fn store_id(&self) -> &str {
        &self.store_id
    }

    async fn open_search_surface(&mut self) -> Result<(), StoreError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            StoreError::navigation(
                &self.store_id,
                format!("cannot read catalog {}: {e}", self.path.display()),
            )
        })?;

        let lines: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect();
        tracing::debug!(store = %self.store_id, titles = lines.len(), "catalog loaded");
        self.lines = Some(lines);
        Ok(())
    }

    async fn search(&mut self, ingredient: &Ingredient) -> Result<(), StoreError> {
        if self.lines.is_none() {
            return Err(StoreError::navigation(&self.store_id, "catalog is not loaded"));
        }
        self.query = Some(ingredient.clone());
        Ok(())
    }

    async fn fetch_result_titles(&mut self) -> Result<Vec<RawResultItem>, StoreError> {
        let (Some(lines), Some(query)) = (&self.lines, &self.query) else {
            return Err(StoreError::navigation(&self.store_id, "no search submitted"));
        };

        let wanted: HashSet<String> = words(query.as_str()).collect();
        let titles: Vec<RawResultItem> = lines
            .iter()
            .filter(|line| line_matches(line, &wanted))
            .map(|line| RawResultItem::new(line.as_str()))
            .collect();

        if titles.is_empty() {
            return Err(StoreError::NoResults {
                store: self.store_id.clone(),
                query: query.as_str().to_string(),
            });
        }
        Ok(titles)
    }

    async fn fetch_brand_set(&mut self) -> Result<BrandSet, StoreError> {
        Ok(self.brands.clone())
    }

    async fn shutdown(&mut self) {
        self.lines = None;
        self.query = None;
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn line_matches(line: &str, wanted: &HashSet<String>) -> bool {
    words(line).any(|word| {
        wanted.contains(&word)
            || wanted
                .iter()
                .any(|q| q.chars().count() >= MIN_PREFIX_LEN && word.starts_with(q.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_catalog(lines: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.txt");
        std::fs::write(&path, lines).unwrap();
        (dir, path)
    }

    #[test]
    fn line_matches_shared_word_or_prefix() {
        let wanted: HashSet<String> = words("honey").collect();
        assert!(line_matches("100% Honey", &wanted));
        assert!(line_matches("Honeydew Melon", &wanted));
        assert!(!line_matches("Maple Syrup", &wanted));
    }

    #[test]
    fn short_query_words_do_not_prefix_match() {
        let wanted: HashSet<String> = words("oj").collect();
        assert!(!line_matches("Ojai Valley Honey", &wanted));
        assert!(line_matches("Fresh OJ", &wanted));
    }

    #[tokio::test]
    async fn open_fails_for_missing_catalog() {
        let mut adapter = CatalogAdapter::new("aldi", "/definitely/not/here.txt", BrandSet::new());
        let err = adapter.open_search_surface().await.unwrap_err();
        assert!(matches!(err, StoreError::Navigation { .. }));
    }

    #[tokio::test]
    async fn search_returns_matching_lines_in_file_order() {
        let (_dir, path) = write_catalog(
            "# aldi produce\nBananas, Bunch\n\nOrganic Bananas 2 lb\nOriginal Pringles Potato Chips Can\n",
        );
        let mut adapter = CatalogAdapter::new("aldi", path, BrandSet::new());
        adapter.open_search_surface().await.unwrap();
        adapter.search(&Ingredient::new("Bananas")).await.unwrap();

        let titles = adapter.fetch_result_titles().await.unwrap();
        let titles: Vec<_> = titles.iter().map(RawResultItem::title).collect();
        assert_eq!(titles, vec!["Bananas, Bunch", "Organic Bananas 2 lb"]);
    }

    #[tokio::test]
    async fn search_without_matches_is_no_results() {
        let (_dir, path) = write_catalog("Bananas, Bunch\n");
        let mut adapter = CatalogAdapter::new("aldi", path, BrandSet::new());
        adapter.open_search_surface().await.unwrap();
        adapter
            .search(&Ingredient::new("general tso sauce"))
            .await
            .unwrap();

        let err = adapter.fetch_result_titles().await.unwrap_err();
        assert!(matches!(err, StoreError::NoResults { ref query, .. } if query == "general tso sauce"));
    }

    #[tokio::test]
    async fn search_after_shutdown_is_navigation_error() {
        let (_dir, path) = write_catalog("Bananas, Bunch\n");
        let mut adapter = CatalogAdapter::new("aldi", path, BrandSet::new());
        adapter.open_search_surface().await.unwrap();
        adapter.shutdown().await;
        let err = adapter.search(&Ingredient::new("bananas")).await.unwrap_err();
        assert!(matches!(err, StoreError::Navigation { .. }));
    }

    #[tokio::test]
    async fn brand_set_is_configured_vocabulary() {
        let brands: BrandSet = ["Simply Nature"].into_iter().collect();
        let mut adapter = CatalogAdapter::new("aldi", "unused.txt", brands);
        assert!(adapter.fetch_brand_set().await.unwrap().contains("simply nature"));
    }
}
