use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use stockcheck_core::{AvailabilityReport, Ingredient, StoreReport};
use tracing::Instrument;

use crate::adapter::StoreAdapter;
use crate::matcher::MatchDecider;
use crate::normalize::TitleNormalizer;
use crate::resolver::StoreResolver;

/// One store to run, with its optional threshold override.
pub struct StoreRun {
    pub adapter: Box<dyn StoreAdapter>,
    pub threshold: Option<f64>,
}

impl StoreRun {
    #[must_use]
    pub fn new(adapter: Box<dyn StoreAdapter>) -> Self {
        Self {
            adapter,
            threshold: None,
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: Option<f64>) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Runs every store in parallel and assembles the availability matrix.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    decider: MatchDecider,
    normalizer: Arc<TitleNormalizer>,
    store_timeout: Option<Duration>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(decider: MatchDecider, normalizer: TitleNormalizer) -> Self {
        Self {
            decider,
            normalizer: Arc::new(normalizer),
            store_timeout: None,
        }
    }

    #[must_use]
    pub fn with_store_timeout(mut self, limit: Option<Duration>) -> Self {
        self.store_timeout = limit;
        self
    }

    /// Resolves `ingredients` against every store, one tokio task per store.
    ///
    /// Never fails. A store that errors or panics gets a row of `false`
    /// without affecting any other store. Rows are aligned with
    /// `ingredients`, duplicates included.
    pub async fn resolve_all(
        &self,
        ingredients: Vec<Ingredient>,
        runs: Vec<StoreRun>,
    ) -> AvailabilityReport {
        let started_at = Utc::now();
        let shared: Arc<[Ingredient]> = ingredients.clone().into();

        tracing::info!(
            stores = runs.len(),
            ingredients = ingredients.len(),
            scorer = self.decider.scorer_name(),
            "resolving availability"
        );

        let mut store_ids = Vec::with_capacity(runs.len());
        let mut handles = Vec::with_capacity(runs.len());
        for run in runs {
            let store = run.adapter.store_id().to_string();
            let decider = match run.threshold {
                Some(threshold) => self.decider.with_threshold(threshold),
                None => self.decider.clone(),
            };
            let mut resolver =
                StoreResolver::new(run.adapter, decider, Arc::clone(&self.normalizer))
                    .with_store_timeout(self.store_timeout);
            let list = Arc::clone(&shared);
            let span = tracing::info_span!("store", store = %store);

            handles.push(tokio::spawn(
                async move { resolver.run(&list).await }.instrument(span),
            ));
            store_ids.push(store);
        }

        let results = join_all(handles).await;
        let reports: Vec<StoreReport> = store_ids
            .into_iter()
            .zip(results)
            .map(|(store, result)| match result {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(store = %store, error = %e, "store worker panicked");
                    StoreReport::unreachable(&store, &shared, format!("store worker panicked: {e}"))
                }
            })
            .collect();

        let report = AvailabilityReport::assemble(ingredients, reports, started_at);
        tracing::info!(
            stores = report.stores.len(),
            failed = report.stores.iter().filter(|s| s.is_failed()).count(),
            "availability resolved"
        );
        report
    }
}
