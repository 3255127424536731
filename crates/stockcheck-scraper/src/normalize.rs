//! Turns scraped product titles into comparison candidates.
//!
//! Every title yields its literal lower-cased form plus a stripped form with
//! punctuation, stop-words, quantities, and brand names removed. The literal
//! form is always kept: stripping can erase the only token that makes a
//! title match (`"100% honey"`), so the stripped form only ever adds a
//! candidate.

use std::collections::HashSet;

use stockcheck_core::BrandSet;

use crate::adapter::RawResultItem;
use crate::stopwords;

/// Characters removed before tokenizing.
const STRIPPED_CHARS: &[char] = &[',', '%', '\'', '\u{2019}'];

/// Which normalization produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// The title lower-cased, otherwise untouched.
    Literal,
    /// The title after stop-word, quantity, and brand removal.
    Stripped,
}

/// One comparison string derived from a scraped title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub kind: CandidateKind,
    /// Index of the source title within the result page.
    pub title_index: usize,
}

impl Candidate {
    #[must_use]
    pub fn literal(text: impl Into<String>, title_index: usize) -> Self {
        Self {
            text: text.into(),
            kind: CandidateKind::Literal,
            title_index,
        }
    }

    #[must_use]
    pub fn stripped(text: impl Into<String>, title_index: usize) -> Self {
        Self {
            text: text.into(),
            kind: CandidateKind::Stripped,
            title_index,
        }
    }
}

/// Title normalizer with a fixed stop-word vocabulary.
#[derive(Debug, Clone)]
pub struct TitleNormalizer {
    stop_words: HashSet<String>,
    dedupe: bool,
}

impl Default for TitleNormalizer {
    fn default() -> Self {
        Self {
            stop_words: stopwords::ENGLISH
                .iter()
                .chain(stopwords::GROCERY)
                .map(|w| (*w).to_string())
                .collect(),
            dedupe: true,
        }
    }
}

impl TitleNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds store- or deployment-specific words to drop.
    #[must_use]
    pub fn with_extra_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        self
    }

    /// When `true` (the default), candidates whose text repeats an earlier
    /// candidate are dropped. The best score is the same either way.
    #[must_use]
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    /// Normalizes one title into its literal and stripped candidates.
    ///
    /// Blank candidates are omitted, so a title that strips to nothing yields
    /// only its literal form.
    #[must_use]
    pub fn normalize(&self, raw_title: &str, brands: &BrandSet) -> Vec<Candidate> {
        let literal = raw_title.trim().to_lowercase();
        if literal.is_empty() {
            return Vec::new();
        }

        let stripped = self.strip(&literal, brands);
        let mut candidates = vec![Candidate::literal(literal, 0)];
        if !stripped.is_empty() && !(self.dedupe && stripped == candidates[0].text) {
            candidates.push(Candidate::stripped(stripped, 0));
        }
        candidates
    }

    /// Normalizes a full result page.
    ///
    /// All literal candidates come first, in title order, followed by all
    /// stripped candidates. The decider breaks ties by first occurrence, so
    /// a literal form wins over an equally scored stripped form.
    #[must_use]
    pub fn normalize_titles(&self, titles: &[RawResultItem], brands: &BrandSet) -> Vec<Candidate> {
        let mut literals = Vec::with_capacity(titles.len());
        let mut stripped = Vec::with_capacity(titles.len());

        for (index, item) in titles.iter().enumerate() {
            let literal = item.title().trim().to_lowercase();
            if literal.is_empty() {
                continue;
            }
            let reduced = self.strip(&literal, brands);
            if !reduced.is_empty() {
                stripped.push(Candidate::stripped(reduced, index));
            }
            literals.push(Candidate::literal(literal, index));
        }

        let all = literals.into_iter().chain(stripped);
        if !self.dedupe {
            return all.collect();
        }

        let mut seen = HashSet::new();
        all.filter(|c| seen.insert(c.text.clone())).collect()
    }

    /// Produces the stripped form of an already lower-cased title.
    #[must_use]
    pub fn strip(&self, lowered: &str, brands: &BrandSet) -> String {
        let mut text: String = lowered.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();

        // Longest brands first so "giant eagle market" is removed before
        // "giant eagle" can split it.
        let mut ordered: Vec<&str> = brands.iter().collect();
        ordered.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        for &brand in &ordered {
            let plural = format!("{brand}s");
            if text.contains(plural.as_str()) {
                text = text.replace(plural.as_str(), "");
            }
            if text.contains(brand) {
                text = text.replace(brand, "");
            }
        }

        tokenize(&text)
            .filter(|token| self.keep_token(token, brands))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn keep_token(&self, token: &str, brands: &BrandSet) -> bool {
        if token.chars().count() <= 1 {
            return false;
        }
        if token.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }
        if self.stop_words.contains(token) {
            return false;
        }
        if brands.contains(token) {
            return false;
        }
        match token.strip_suffix('s') {
            Some(singular) => !brands.contains(singular),
            None => true,
        }
    }
}

/// Splits on whitespace and trims punctuation from token edges. Inner
/// punctuation (`cheez-it`) stays.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
