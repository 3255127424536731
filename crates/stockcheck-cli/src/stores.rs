use std::path::Path;

use anyhow::Context;
use stockcheck_core::{AppConfig, StoresFile};

/// List configured stores with their effective thresholds.
///
/// # Errors
///
/// Returns an error if the stores file cannot be loaded or fails validation.
pub(crate) fn run_stores(config: &AppConfig, stores_path: &Path) -> anyhow::Result<()> {
    let stores = stockcheck_core::load_stores(stores_path)
        .with_context(|| format!("failed to load stores from {}", stores_path.display()))?;
    print!("{}", render_stores(&stores, config.match_threshold));
    Ok(())
}

pub(crate) fn render_stores(stores: &StoresFile, default_threshold: f64) -> String {
    if stores.stores.is_empty() {
        return "no stores configured\n".to_string();
    }

    let mut out = format!(
        "{:<22}{:<13}{:<15}{:<9}NAME\n",
        "ID", "KIND", "THRESHOLD", "ENABLED"
    );
    for store in &stores.stores {
        let threshold = store.threshold.map_or_else(
            || format!("{default_threshold} (default)"),
            |t| t.to_string(),
        );
        out.push_str(&format!(
            "{:<22}{:<13}{:<15}{:<9}{}\n",
            store.slug(),
            store.kind.to_string(),
            threshold,
            if store.enabled { "yes" } else { "no" },
            store.name
        ));
    }
    out
}
