pub mod aggregator;
pub mod classify;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod sources;
pub mod store;
pub mod watchlist;

#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

pub use aggregator::{Aggregator, AggregatorConfig, PersistedRun};
pub use classify::{classify_severity, FixedRatioEstimator, SentimentEstimator, SentimentSplit};
pub use error::{PersistenceError, RunError, SourceError};
pub use fallback::{FallbackGenerator, FallbackRequest};
pub use mentionscope_common::*;
pub use normalize::{Normalized, Normalizer};
pub use sources::{RawPayload, SourceClient, SourceQuery, SourceRegistry};
pub use store::{MemoryGateway, PersistenceGateway, PgGateway};
pub use watchlist::{
    add_keyword, remove_keyword, KeywordWatchStore, MemoryWatchStore, PgWatchStore, WatchedKeyword,
};
