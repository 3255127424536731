//! `check` command: resolve ingredients against every enabled store.
//!
//! Store failures never fail the command. They show up as `--` cells and a
//! failure note under the table, and the exit code stays 0.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use stockcheck_core::{AppConfig, AvailabilityReport, DecisionReason, Ingredient, StoreOutcome};
use stockcheck_scraper::{
    build_adapter, scorer_for, HttpNavigatorSettings, MatchDecider, Orchestrator, StoreRun,
    TitleNormalizer,
};

/// Widest ingredient column before truncation.
const MAX_COLUMN_WIDTH: usize = 18;

/// # Errors
///
/// Returns an error if an ingredient is blank or missing, the stores file
/// cannot be loaded, no store is enabled, or an adapter cannot be built.
pub(crate) async fn run_check(
    config: &AppConfig,
    stores_path: &Path,
    threshold: Option<f64>,
    json: bool,
    raw_ingredients: &[String],
) -> anyhow::Result<()> {
    let ingredients = parse_ingredients(raw_ingredients)?;

    let stores = stockcheck_core::load_stores(stores_path)
        .with_context(|| format!("failed to load stores from {}", stores_path.display()))?;

    let settings = HttpNavigatorSettings::from_config(config);
    let mut runs = Vec::new();
    for store in stores.enabled() {
        let adapter = build_adapter(store, &settings)
            .with_context(|| format!("failed to set up store '{}'", store.name))?;
        runs.push(StoreRun::new(adapter).with_threshold(store.threshold));
    }
    if runs.is_empty() {
        anyhow::bail!("no enabled stores in {}", stores_path.display());
    }

    let decider = MatchDecider::new(
        scorer_for(config.scorer),
        threshold.unwrap_or(config.match_threshold),
    );
    let orchestrator = Orchestrator::new(decider, TitleNormalizer::new())
        .with_store_timeout(config.store_timeout_secs.map(Duration::from_secs));

    let report = orchestrator.resolve_all(ingredients, runs).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_table(&report));
    }
    Ok(())
}

/// Turns command-line arguments into ingredients, one per argument.
///
/// # Errors
///
/// Returns an error if no argument is given or any argument is blank, so
/// report rows always line up with the arguments.
pub(crate) fn parse_ingredients(raw: &[String]) -> anyhow::Result<Vec<Ingredient>> {
    if raw.is_empty() {
        anyhow::bail!("no ingredients given");
    }
    raw.iter()
        .enumerate()
        .map(|(index, arg)| {
            let ingredient = Ingredient::new(arg);
            if ingredient.as_str().is_empty() {
                anyhow::bail!("ingredient at position {} is blank", index + 1);
            }
            Ok(ingredient)
        })
        .collect()
}

/// Renders the matrix as a fixed-width table, one row per store.
pub(crate) fn render_table(report: &AvailabilityReport) -> String {
    let store_width = report
        .stores
        .iter()
        .map(|s| s.store.len())
        .max()
        .unwrap_or(0)
        .max("STORE".len())
        + 2;
    let columns: Vec<String> = report
        .ingredients
        .iter()
        .map(|i| truncate(i.as_str(), MAX_COLUMN_WIDTH))
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .map(|c| c.chars().count().max("yes".len()) + 2)
        .collect();

    let mut out = format!("{:<store_width$}", "STORE");
    for (column, width) in columns.iter().zip(&widths) {
        out.push_str(&format!("{column:<width$}", width = *width));
    }
    out = out.trim_end().to_string();
    out.push('\n');

    for store in &report.stores {
        let mut line = format!("{:<store_width$}", store.store);
        for (decision, width) in store.decisions.iter().zip(&widths) {
            let cell = if decision.matched {
                "yes"
            } else if decision.reason == DecisionReason::StoreUnreachable {
                "--"
            } else {
                "no"
            };
            line.push_str(&format!("{cell:<width$}", width = *width));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let failures: Vec<String> = report
        .stores
        .iter()
        .filter_map(|s| match &s.outcome {
            StoreOutcome::Failed { error } => Some(format!("  {}: {error}", s.store)),
            StoreOutcome::Done => None,
        })
        .collect();
    if !failures.is_empty() {
        out.push_str("\nunreachable stores:\n");
        for failure in failures {
            out.push_str(&failure);
            out.push('\n');
        }
    }

    let complete: Vec<&str> = report.matrix.stores_with_all().collect();
    out.push('\n');
    if complete.is_empty() {
        out.push_str("no store carries every ingredient\n");
    } else {
        out.push_str(&format!("carries everything: {}\n", complete.join(", ")));
    }

    let elapsed = report.finished_at - report.started_at;
    out.push_str(&format!(
        "resolved {} ingredients across {} stores in {}ms\n",
        report.ingredients.len(),
        report.stores.len(),
        elapsed.num_milliseconds()
    ));
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max - 3).collect::<String>())
    } else {
        text.to_string()
    }
}
