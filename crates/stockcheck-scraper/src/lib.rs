pub mod adapter;
pub mod adapters;
pub mod error;
pub mod matcher;
pub mod navigator;
pub mod normalize;
pub mod orchestrator;
pub mod resolver;

mod retry;
mod stopwords;

pub use adapter::{RawResultItem, StoreAdapter};
pub use adapters::{build_adapter, CatalogAdapter, SearchPageAdapter};
pub use error::{NavError, StoreError};
pub use matcher::{
    scorer_for, JaroWinkler, MatchDecider, MatchEvidence, Scorer, TokenSetRatio, TokenSortRatio,
};
pub use navigator::{ElementHandle, HttpNavigator, HttpNavigatorSettings, Navigator};
pub use normalize::{Candidate, CandidateKind, TitleNormalizer};
pub use orchestrator::{Orchestrator, StoreRun};
pub use resolver::{ResolverState, StoreResolver};
