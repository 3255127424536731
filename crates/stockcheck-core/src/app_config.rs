use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Similarity function used by the match decider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerKind {
    /// Token-sort ratio: words sorted, then Indel similarity. Order-insensitive
    /// but penalizes extra words.
    TokenSort,
    /// Token-set ratio: scores intersections, so supersets score high.
    TokenSet,
    /// Jaro-Winkler over the raw lower-cased strings.
    JaroWinkler,
}

impl std::fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScorerKind::TokenSort => write!(f, "token_sort"),
            ScorerKind::TokenSet => write!(f, "token_set"),
            ScorerKind::JaroWinkler => write!(f, "jaro_winkler"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub stores_path: PathBuf,
    /// Global score threshold in `0..=100`. A candidate must score strictly
    /// above it to count as a match.
    pub match_threshold: f64,
    pub scorer: ScorerKind,
    /// Ceiling for every bounded wait on a page condition.
    pub wait_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Whole-store timeout. `None` lets every store run to completion.
    pub store_timeout_secs: Option<u64>,
}
