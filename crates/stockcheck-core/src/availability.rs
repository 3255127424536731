//! Result types shared by the resolver, the orchestrator, and the CLI.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A caller-supplied query, lower-cased and trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ingredient(String);

impl Ingredient {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ingredient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-cased brand names known for one store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandSet(BTreeSet<String>);

impl BrandSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a brand, lower-cased and trimmed. Blank names are ignored.
    pub fn insert(&mut self, brand: &str) {
        let brand = brand.trim().to_lowercase();
        if !brand.is_empty() {
            self.0.insert(brand);
        }
    }

    pub fn extend(&mut self, other: &BrandSet) {
        self.0.extend(other.0.iter().cloned());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, brand: &str) -> bool {
        self.0.contains(brand)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for BrandSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = BrandSet::new();
        for brand in iter {
            set.insert(brand.as_ref());
        }
        set
    }
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// Best candidate scored strictly above the threshold.
    Matched,
    /// Results were scored but nothing cleared the threshold.
    BelowThreshold,
    /// The store returned no result elements for the query.
    NoResults,
    /// The store could not be reached; the ingredient was never searched.
    StoreUnreachable,
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionReason::Matched => write!(f, "matched"),
            DecisionReason::BelowThreshold => write!(f, "below_threshold"),
            DecisionReason::NoResults => write!(f, "no_results"),
            DecisionReason::StoreUnreachable => write!(f, "store_unreachable"),
        }
    }
}

/// The presence decision for one (ingredient, store) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDecision {
    pub ingredient: Ingredient,
    pub store: String,
    pub matched: bool,
    /// Score of the best candidate in `0..=100`; `0` when nothing was scored.
    pub best_score: f64,
    /// Text of the best candidate; empty when nothing was scored.
    pub best_candidate: String,
    pub reason: DecisionReason,
}

impl MatchDecision {
    /// A negative decision that never reached scoring.
    #[must_use]
    pub fn skipped(ingredient: Ingredient, store: &str, reason: DecisionReason) -> Self {
        Self {
            ingredient,
            store: store.to_string(),
            matched: false,
            best_score: 0.0,
            best_candidate: String::new(),
            reason,
        }
    }
}

/// Terminal state of one store's run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StoreOutcome {
    /// Every ingredient was attempted.
    Done,
    /// The store was abandoned part-way; remaining ingredients are
    /// `store_unreachable`.
    Failed { error: String },
}

/// Everything one store worker reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreReport {
    pub store: String,
    pub outcome: StoreOutcome,
    /// Aligned positionally with the ingredient list.
    pub decisions: Vec<MatchDecision>,
}

impl StoreReport {
    /// A failed report with every position `store_unreachable`.
    #[must_use]
    pub fn unreachable(store: &str, ingredients: &[Ingredient], error: impl Into<String>) -> Self {
        Self {
            store: store.to_string(),
            outcome: StoreOutcome::Failed {
                error: error.into(),
            },
            decisions: ingredients
                .iter()
                .map(|i| MatchDecision::skipped(i.clone(), store, DecisionReason::StoreUnreachable))
                .collect(),
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, StoreOutcome::Failed { .. })
    }

    /// Booleans aligned with the ingredient list.
    #[must_use]
    pub fn availability(&self) -> Vec<bool> {
        self.decisions.iter().map(|d| d.matched).collect()
    }
}

/// Store id → per-ingredient availability, aligned with the ingredient list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityMatrix(BTreeMap<String, Vec<bool>>);

impl AvailabilityMatrix {
    pub fn insert(&mut self, store: String, row: Vec<bool>) {
        self.0.insert(store, row);
    }

    #[must_use]
    pub fn get(&self, store: &str) -> Option<&[bool]> {
        self.0.get(store).map(Vec::as_slice)
    }

    pub fn stores(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &[bool])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stores that carry every ingredient.
    pub fn stores_with_all(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, row)| row.iter().all(|&found| found))
            .map(|(store, _)| store.as_str())
    }
}

/// Full output of one run: the matrix plus per-store evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub ingredients: Vec<Ingredient>,
    pub matrix: AvailabilityMatrix,
    pub stores: Vec<StoreReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl AvailabilityReport {
    /// Builds the report from per-store results. Store order follows
    /// `reports`.
    #[must_use]
    pub fn assemble(
        ingredients: Vec<Ingredient>,
        reports: Vec<StoreReport>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let mut matrix = AvailabilityMatrix::default();
        for report in &reports {
            matrix.insert(report.store.clone(), report.availability());
        }
        Self {
            ingredients,
            matrix,
            stores: reports,
            started_at,
            finished_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn store(&self, store: &str) -> Option<&StoreReport> {
        self.stores.iter().find(|r| r.store == store)
    }
}
