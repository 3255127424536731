//! Drives one store adapter through the ingredient list.
//!
//! The resolver is a small state machine:
//!
//! ```text
//! Idle -> SurfaceOpen -> (Searching -> Evaluating)* -> Done
//!   \__________\______________\__________\_________-> Failed
//! ```
//!
//! Whatever happens, [`StoreResolver::run`] returns exactly one decision per
//! ingredient and releases the adapter's session.

use std::sync::Arc;
use std::time::Duration;

use stockcheck_core::{
    BrandSet, DecisionReason, Ingredient, MatchDecision, StoreOutcome, StoreReport,
};

use crate::adapter::{RawResultItem, StoreAdapter};
use crate::error::StoreError;
use crate::matcher::MatchDecider;
use crate::normalize::TitleNormalizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Idle,
    SurfaceOpen,
    Searching,
    Evaluating,
    Done,
    Failed,
}

impl std::fmt::Display for ResolverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolverState::Idle => write!(f, "idle"),
            ResolverState::SurfaceOpen => write!(f, "surface_open"),
            ResolverState::Searching => write!(f, "searching"),
            ResolverState::Evaluating => write!(f, "evaluating"),
            ResolverState::Done => write!(f, "done"),
            ResolverState::Failed => write!(f, "failed"),
        }
    }
}

pub struct StoreResolver {
    adapter: Box<dyn StoreAdapter>,
    decider: MatchDecider,
    normalizer: Arc<TitleNormalizer>,
    store_timeout: Option<Duration>,
    state: ResolverState,
    /// `None` until the first successful result fetch.
    brands: Option<BrandSet>,
    decisions: Vec<MatchDecision>,
}

impl StoreResolver {
    #[must_use]
    pub fn new(
        adapter: Box<dyn StoreAdapter>,
        decider: MatchDecider,
        normalizer: Arc<TitleNormalizer>,
    ) -> Self {
        Self {
            adapter,
            decider,
            normalizer,
            store_timeout: None,
            state: ResolverState::Idle,
            brands: None,
            decisions: Vec::new(),
        }
    }

    /// Bounds the whole store run. Positions not reached in time are
    /// `store_unreachable`.
    #[must_use]
    pub fn with_store_timeout(mut self, limit: Option<Duration>) -> Self {
        self.store_timeout = limit;
        self
    }

    #[must_use]
    pub fn state(&self) -> ResolverState {
        self.state
    }

    #[must_use]
    pub fn store_id(&self) -> &str {
        self.adapter.store_id()
    }

    /// Runs the store over `ingredients` in order.
    ///
    /// Never fails: a store-fatal error ends the run in
    /// [`ResolverState::Failed`] with every remaining position marked
    /// `store_unreachable`. `shutdown` is called on the adapter on every path.
    pub async fn run(&mut self, ingredients: &[Ingredient]) -> StoreReport {
        let store = self.adapter.store_id().to_string();
        self.decisions = Vec::with_capacity(ingredients.len());
        self.brands = None;
        self.state = ResolverState::Idle;

        let result = match self.store_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.drive(ingredients)).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::navigation(
                    &store,
                    format!("store run exceeded {}ms", limit.as_millis()),
                )),
            },
            None => self.drive(ingredients).await,
        };

        let outcome = match result {
            Ok(()) => {
                self.transition(ResolverState::Done);
                StoreOutcome::Done
            }
            Err(err) => {
                let completed = self.decisions.len();
                tracing::warn!(
                    store = %store,
                    completed,
                    remaining = ingredients.len() - completed,
                    error = %err,
                    "store failed; remaining ingredients marked unreachable"
                );
                for ingredient in &ingredients[completed..] {
                    self.decisions.push(MatchDecision::skipped(
                        ingredient.clone(),
                        &store,
                        DecisionReason::StoreUnreachable,
                    ));
                }
                self.transition(ResolverState::Failed);
                StoreOutcome::Failed {
                    error: err.to_string(),
                }
            }
        };

        self.adapter.shutdown().await;

        let decisions = std::mem::take(&mut self.decisions);
        tracing::info!(
            store = %store,
            state = %self.state,
            matched = decisions.iter().filter(|d| d.matched).count(),
            total = decisions.len(),
            "store run finished"
        );
        StoreReport {
            store,
            outcome,
            decisions,
        }
    }

    async fn drive(&mut self, ingredients: &[Ingredient]) -> Result<(), StoreError> {
        self.adapter.open_search_surface().await?;
        self.transition(ResolverState::SurfaceOpen);

        for ingredient in ingredients {
            self.transition(ResolverState::Searching);
            self.adapter.search(ingredient).await?;

            self.transition(ResolverState::Evaluating);
            let decision = match self.adapter.fetch_result_titles().await {
                Ok(titles) if !titles.is_empty() => {
                    self.ensure_brands().await;
                    self.evaluate(ingredient, &titles)
                }
                Ok(_) | Err(StoreError::NoResults { .. }) => {
                    tracing::debug!(store = %self.adapter.store_id(), %ingredient, "no results");
                    MatchDecision::skipped(
                        ingredient.clone(),
                        self.adapter.store_id(),
                        DecisionReason::NoResults,
                    )
                }
                Err(err) => return Err(err),
            };
            self.decisions.push(decision);
        }
        Ok(())
    }

    /// Fetches the brand set once per run. A failed lookup is cached as
    /// empty so it is not retried for every ingredient.
    async fn ensure_brands(&mut self) {
        if self.brands.is_some() {
            return;
        }
        let brands = match self.adapter.fetch_brand_set().await {
            Ok(brands) => {
                tracing::debug!(store = %self.adapter.store_id(), count = brands.len(), "brand set loaded");
                brands
            }
            Err(err) => {
                tracing::warn!(
                    store = %self.adapter.store_id(),
                    error = %err,
                    "brand lookup failed; continuing without brand stripping"
                );
                BrandSet::new()
            }
        };
        self.brands = Some(brands);
    }

    fn evaluate(&self, ingredient: &Ingredient, titles: &[RawResultItem]) -> MatchDecision {
        let empty = BrandSet::new();
        let brands = self.brands.as_ref().unwrap_or(&empty);
        let candidates = self.normalizer.normalize_titles(titles, brands);
        let evidence = self.decider.decide(ingredient.as_str(), &candidates);

        let best_candidate = evidence
            .best_candidate
            .map(|c| c.text)
            .unwrap_or_default();
        tracing::debug!(
            store = %self.adapter.store_id(),
            %ingredient,
            titles = titles.len(),
            candidates = candidates.len(),
            best_score = evidence.best_score,
            best_candidate = %best_candidate,
            matched = evidence.matched,
            "ingredient evaluated"
        );

        MatchDecision {
            ingredient: ingredient.clone(),
            store: self.adapter.store_id().to_string(),
            matched: evidence.matched,
            best_score: evidence.best_score,
            best_candidate,
            reason: if evidence.matched {
                DecisionReason::Matched
            } else {
                DecisionReason::BelowThreshold
            },
        }
    }

    fn transition(&mut self, next: ResolverState) {
        tracing::debug!(store = %self.adapter.store_id(), from = %self.state, to = %next, "resolver transition");
        self.state = next;
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
