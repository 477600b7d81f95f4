use std::time::Duration;

use apify_client::ApifyError;
use mentionscope_common::{PermissionDenied, SourceName, ValidationError};

/// Why one source produced no live data. Always recovered inside the
/// aggregator: the source is marked `error` and receives fallback rows.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cancelled by caller")]
    Cancelled,

    #[error("No client configured for {0}")]
    NotConfigured(SourceName),
}

impl From<ApifyError> for SourceError {
    fn from(err: ApifyError) -> Self {
        SourceError::Transport(err.to_string())
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Transport(format!("malformed JSON: {err}"))
    }
}

/// Storage failure. Reported next to a result, never instead of one.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Rejection from the caller-side gate in `Aggregator::run_authorized`.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Forbidden(#[from] PermissionDenied),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
