//! Candidate scoring and the threshold decision.
//!
//! Scores are on a `0..=100` scale. The default scorer is token-sort: both
//! strings are reduced to their sorted word lists, so word order does not
//! matter but extra words do. That keeps "lemon" from matching
//! "lemon cheesecake", at the price of also scoring "honey" close to
//! "honeydew". Swap the [`Scorer`] to trade one failure mode for another.

use std::collections::BTreeSet;
use std::sync::Arc;

use stockcheck_core::ScorerKind;

use crate::normalize::Candidate;

/// A string similarity function on a `0..=100` scale.
pub trait Scorer: Send + Sync {
    fn score(&self, query: &str, candidate: &str) -> f64;

    /// Name used in logs.
    fn name(&self) -> &'static str;
}

/// Indel similarity of the sorted word lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortRatio;

impl Scorer for TokenSortRatio {
    fn score(&self, query: &str, candidate: &str) -> f64 {
        let mut a = tokens(query);
        let mut b = tokens(candidate);
        a.sort_unstable();
        b.sort_unstable();
        indel_ratio(&a.join(" "), &b.join(" "))
    }

    fn name(&self) -> &'static str {
        "token_sort"
    }
}

/// Scores shared words against each side's extra words. Any string whose
/// words are a superset of the query's scores 100.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSetRatio;

impl Scorer for TokenSetRatio {
    fn score(&self, query: &str, candidate: &str) -> f64 {
        let a: BTreeSet<String> = tokens(query).into_iter().collect();
        let b: BTreeSet<String> = tokens(candidate).into_iter().collect();
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let shared = join(a.intersection(&b));
        let only_a = join(a.difference(&b));
        let only_b = join(b.difference(&a));

        if !shared.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
            return 100.0;
        }

        let with_a = join_nonempty(&shared, &only_a);
        let with_b = join_nonempty(&shared, &only_b);

        let mut best = indel_ratio(&with_a, &with_b);
        if !shared.is_empty() {
            best = best
                .max(indel_ratio(&shared, &with_a))
                .max(indel_ratio(&shared, &with_b));
        }
        best
    }

    fn name(&self) -> &'static str {
        "token_set"
    }
}

/// Jaro-Winkler over the processed strings, scaled to `0..=100`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl Scorer for JaroWinkler {
    fn score(&self, query: &str, candidate: &str) -> f64 {
        let a = tokens(query).join(" ");
        let b = tokens(candidate).join(" ");
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        (strsim::jaro_winkler(&a, &b) * 100.0).round()
    }

    fn name(&self) -> &'static str {
        "jaro_winkler"
    }
}

/// Returns the scorer configured by `kind`.
#[must_use]
pub fn scorer_for(kind: ScorerKind) -> Arc<dyn Scorer> {
    match kind {
        ScorerKind::TokenSort => Arc::new(TokenSortRatio),
        ScorerKind::TokenSet => Arc::new(TokenSetRatio),
        ScorerKind::JaroWinkler => Arc::new(JaroWinkler),
    }
}

/// Outcome of scoring one query against a candidate set.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchEvidence {
    pub matched: bool,
    pub best_score: f64,
    pub best_candidate: Option<Candidate>,
}

/// Picks the best candidate and applies the threshold.
#[derive(Clone)]
pub struct MatchDecider {
    scorer: Arc<dyn Scorer>,
    threshold: f64,
}

impl std::fmt::Debug for MatchDecider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchDecider")
            .field("scorer", &self.scorer.name())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl MatchDecider {
    #[must_use]
    pub fn new(scorer: Arc<dyn Scorer>, threshold: f64) -> Self {
        Self { scorer, threshold }
    }

    /// Same scorer, different threshold.
    #[must_use]
    pub fn with_threshold(&self, threshold: f64) -> Self {
        Self {
            scorer: Arc::clone(&self.scorer),
            threshold,
        }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// Scores every candidate against `query`.
    ///
    /// The best candidate is the first one whose score beats every earlier
    /// score, so ties go to the earlier candidate. A match requires the best
    /// score to be strictly greater than the threshold. An empty candidate
    /// set is a non-match with score `0`.
    #[must_use]
    pub fn decide(&self, query: &str, candidates: &[Candidate]) -> MatchEvidence {
        let mut best: Option<(f64, &Candidate)> = None;

        for candidate in candidates {
            let score = self.scorer.score(query, &candidate.text);
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, candidate));
            }
        }

        match best {
            Some((best_score, candidate)) => MatchEvidence {
                matched: best_score > self.threshold,
                best_score,
                best_candidate: Some(candidate.clone()),
            },
            None => MatchEvidence {
                matched: false,
                best_score: 0.0,
                best_candidate: None,
            },
        }
    }
}

/// Lower-cases and splits on anything that is not alphanumeric.
fn tokens(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn join<'a>(words: impl Iterator<Item = &'a String>) -> String {
    words.map(String::as_str).collect::<Vec<_>>().join(" ")
}

fn join_nonempty(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{a} {b}"),
    }
}

/// `100 * (1 - indel_distance / (len_a + len_b))`, rounded half to even so
/// an exact `.5` lands on the even score. Indel distance counts insertions
/// and deletions only, which makes it `len_a + len_b - 2 * lcs`.
fn indel_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let ratio = 200.0 * lcs_len(&a, &b) as f64 / total as f64;
    ratio.round_ties_even()
}

/// Longest common subsequence length, two-row dynamic programming.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
