use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::validate_threshold;
use crate::ConfigError;

/// How a store is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Live search through the store's public search page.
    SearchPage,
    /// In-memory scan of a pre-fetched catalog file.
    Catalog,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::SearchPage => write!(f, "search_page"),
            StoreKind::Catalog => write!(f, "catalog"),
        }
    }
}

/// An element locator. Opaque to the core; its syntax belongs to the
/// navigator that evaluates it (the HTTP navigator reads it as a regex whose
/// first capture group is the element text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    #[must_use]
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Page layout of a store's search surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPageLayout {
    /// Page holding the search input.
    pub entry_url: String,
    /// Elements clicked once after opening, best effort (cookie banners).
    #[serde(default)]
    pub dismiss: Vec<Locator>,
    pub search_input: Locator,
    /// Query parameter name used when the search form is submitted as a URL.
    #[serde(default = "default_query_param")]
    pub query_param: String,
    /// Elements clicked in order after each submit before results are
    /// visible (e.g. "see all results", "products" tab).
    #[serde(default)]
    pub reveal: Vec<Locator>,
    pub result_title: Locator,
    /// Button that opens the brand facet. Labels are read without clicking
    /// when absent.
    #[serde(default)]
    pub brand_facet: Option<Locator>,
    #[serde(default)]
    pub brand_label: Option<Locator>,
}

fn default_query_param() -> String {
    "q".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub name: String,
    pub kind: StoreKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Per-store override of the global match threshold.
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Static brand vocabulary, merged with whatever the store's brand facet
    /// reports.
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub layout: Option<SearchPageLayout>,
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl StoreConfig {
    /// Store identifier used as the availability matrix key.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<StoreConfig>,
}

impl StoresFile {
    /// Stores with `enabled: true`, in file order.
    pub fn enabled(&self) -> impl Iterator<Item = &StoreConfig> {
        self.stores.iter().filter(|s| s.enabled)
    }
}

/// Load and validate the store definitions from a YAML file.
///
/// Relative `catalog_path` entries are resolved against the directory that
/// holds the stores file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stores(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut stores_file: StoresFile =
        serde_yaml::from_str(&content).map_err(ConfigError::StoresFileParse)?;

    validate_stores(&stores_file)?;

    if let Some(base) = path.parent() {
        for store in &mut stores_file.stores {
            if let Some(catalog) = store.catalog_path.as_mut() {
                if catalog.is_relative() {
                    *catalog = base.join(&*catalog);
                }
            }
        }
    }

    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for store in &stores_file.stores {
        if store.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(store.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store name: '{}'",
                store.name
            )));
        }

        let slug = store.slug();
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "store name '{}' produces an empty slug",
                store.name
            )));
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store slug: '{}' (from store '{}')",
                slug, store.name
            )));
        }

        if let Some(threshold) = store.threshold {
            validate_threshold(threshold).map_err(|reason| {
                ConfigError::Validation(format!("store '{}': {reason}", store.name))
            })?;
        }

        match store.kind {
            StoreKind::SearchPage => validate_layout(store)?,
            StoreKind::Catalog => {
                if store.catalog_path.is_none() {
                    return Err(ConfigError::Validation(format!(
                        "catalog store '{}' has no catalog_path",
                        store.name
                    )));
                }
            }
        }
    }

    Ok(())
}

fn validate_layout(store: &StoreConfig) -> Result<(), ConfigError> {
    let Some(layout) = &store.layout else {
        return Err(ConfigError::Validation(format!(
            "search_page store '{}' has no layout",
            store.name
        )));
    };

    if layout.entry_url.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "store '{}' has an empty entry_url",
            store.name
        )));
    }

    if layout.brand_facet.is_some() && layout.brand_label.is_none() {
        return Err(ConfigError::Validation(format!(
            "store '{}' sets brand_facet without brand_label",
            store.name
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "stores_test.rs"]
mod tests;
