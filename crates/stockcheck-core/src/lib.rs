pub mod app_config;
pub mod availability;
pub mod config;
pub mod stores;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, ScorerKind};
pub use availability::{
    AvailabilityMatrix, AvailabilityReport, BrandSet, DecisionReason, Ingredient, MatchDecision,
    StoreOutcome, StoreReport,
};
pub use config::{load_app_config, load_app_config_from_env, parse_threshold};
pub use stores::{
    load_stores, Locator, SearchPageLayout, StoreConfig, StoreKind, StoresFile,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read stores file {path}: {source}")]
    StoresFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stores file: {0}")]
    StoresFileParse(#[from] serde_yaml::Error),

    #[error("stores file validation failed: {0}")]
    Validation(String),
}
