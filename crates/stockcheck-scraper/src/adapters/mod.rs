//! Shipped [`StoreAdapter`] implementations and the config-driven factory.

mod catalog;
mod search_page;

use stockcheck_core::{BrandSet, StoreConfig, StoreKind};

use crate::adapter::StoreAdapter;
use crate::error::StoreError;
use crate::navigator::{HttpNavigator, HttpNavigatorSettings};

pub use catalog::CatalogAdapter;
pub use search_page::SearchPageAdapter;

/// Builds the adapter a store's configuration asks for. Search-page stores
/// get a fresh [`HttpNavigator`] session.
///
/// # Errors
///
/// Returns [`StoreError::Navigation`] if the store is missing its
/// kind-specific settings or the HTTP client cannot be built.
pub fn build_adapter(
    store: &StoreConfig,
    settings: &HttpNavigatorSettings,
) -> Result<Box<dyn StoreAdapter>, StoreError> {
    let store_id = store.slug();
    let brands: BrandSet = store.brands.iter().collect();

    match store.kind {
        StoreKind::SearchPage => {
            let layout = store.layout.clone().ok_or_else(|| {
                StoreError::navigation(&store_id, "search_page store has no layout")
            })?;
            let navigator = HttpNavigator::new(settings.clone(), &layout.query_param)
                .map_err(|e| StoreError::navigation(&store_id, e))?;
            let adapter = SearchPageAdapter::new(store_id, navigator, layout, settings.wait_timeout)
                .with_static_brands(brands);
            Ok(Box::new(adapter))
        }
        StoreKind::Catalog => {
            let path = store.catalog_path.clone().ok_or_else(|| {
                StoreError::navigation(&store_id, "catalog store has no catalog_path")
            })?;
            Ok(Box::new(CatalogAdapter::new(store_id, path, brands)))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use stockcheck_core::{Locator, SearchPageLayout};

    use super::*;

    fn store(kind: StoreKind) -> StoreConfig {
        StoreConfig {
            name: "Trader Joe's".to_string(),
            kind,
            enabled: true,
            threshold: None,
            brands: vec!["Trader Joe's".to_string()],
            layout: None,
            catalog_path: None,
            notes: None,
        }
    }

    #[test]
    fn catalog_store_builds_with_slug_id() {
        let mut config = store(StoreKind::Catalog);
        config.catalog_path = Some(PathBuf::from("catalogs/tj.txt"));
        let adapter = build_adapter(&config, &HttpNavigatorSettings::default()).unwrap();
        assert_eq!(adapter.store_id(), "trader-joes");
    }

    #[test]
    fn search_page_store_builds() {
        let mut config = store(StoreKind::SearchPage);
        config.layout = Some(SearchPageLayout {
            entry_url: "https://shop.example.com/".to_string(),
            dismiss: vec![],
            search_input: Locator::new(r#"<form[^>]*action="([^"]*)""#),
            query_param: "q".to_string(),
            reveal: vec![],
            result_title: Locator::new(r#"<h2 class="title">(.*?)</h2>"#),
            brand_facet: None,
            brand_label: None,
        });
        let adapter = build_adapter(&config, &HttpNavigatorSettings::default()).unwrap();
        assert_eq!(adapter.store_id(), "trader-joes");
    }

    #[test]
    fn missing_kind_settings_are_rejected() {
        let settings = HttpNavigatorSettings::default();
        assert!(build_adapter(&store(StoreKind::Catalog), &settings).is_err());
        assert!(build_adapter(&store(StoreKind::SearchPage), &settings).is_err());
    }
}
