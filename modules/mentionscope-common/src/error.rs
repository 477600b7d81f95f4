use thiserror::Error;

/// A malformed `SearchRequest`. The only error that rejects an aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Validation error: search term is empty")]
    EmptyTerm,

    #[error("Validation error: no sources requested")]
    NoSources,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Returned by the caller-side search gate when the capability is missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Permission denied: {0}")]
pub struct PermissionDenied(pub &'static str);
