use std::env;
use std::time::Duration;

use tracing::info;

use crate::error::ConfigError;

/// Application configuration loaded from environment variables.
///
/// Every vendor key is optional: a source without credentials is simply not
/// registered and degrades to fallback data when requested.
#[derive(Debug, Clone)]
pub struct Config {
    // Vendors
    pub apify_api_key: Option<String>,
    pub serper_api_key: Option<String>,

    // Storage
    pub database_url: Option<String>,

    // Aggregation
    pub source_timeout: Duration,
    pub max_results: u32,
    pub fallback_per_source: usize,
    pub fallback_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            apify_api_key: None,
            serper_api_key: None,
            database_url: None,
            source_timeout: Duration::from_secs(20),
            max_results: 100,
            fallback_per_source: 5,
            fallback_seed: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let source_timeout = match get("SOURCE_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_positive(
                "SOURCE_TIMEOUT_SECS",
                "a positive whole number of seconds",
                &v,
            )?),
            None => defaults.source_timeout,
        };
        let max_results = match get("MAX_RESULTS") {
            Some(v) => parse_positive("MAX_RESULTS", "a positive integer", &v)?,
            None => defaults.max_results,
        };
        let fallback_per_source = match get("FALLBACK_PER_SOURCE") {
            Some(v) => parse("FALLBACK_PER_SOURCE", "a non-negative integer", &v)?,
            None => defaults.fallback_per_source,
        };
        let fallback_seed = match get("FALLBACK_SEED") {
            Some(v) => Some(parse("FALLBACK_SEED", "an unsigned 64-bit integer", &v)?),
            None => None,
        };

        Ok(Self {
            apify_api_key: get("APIFY_API_KEY"),
            serper_api_key: get("SERPER_API_KEY"),
            database_url: get("DATABASE_URL"),
            source_timeout,
            max_results,
            fallback_per_source,
            fallback_seed,
        })
    }

    /// Log the effective configuration without secret values.
    pub fn log_redacted(&self) {
        info!(
            apify = self.apify_api_key.is_some(),
            serper = self.serper_api_key.is_some(),
            database = self.database_url.is_some(),
            source_timeout_secs = self.source_timeout.as_secs(),
            max_results = self.max_results,
            fallback_per_source = self.fallback_per_source,
            seeded = self.fallback_seed.is_some(),
            "Loaded config"
        );
    }
}

fn parse<T: std::str::FromStr>(
    key: &'static str,
    expected: &'static str,
    value: &str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        expected,
        value: value.to_string(),
    })
}

/// Like `parse`, but zero is rejected too.
fn parse_positive<T: std::str::FromStr + Default + PartialEq>(
    key: &'static str,
    expected: &'static str,
    value: &str,
) -> Result<T, ConfigError> {
    let parsed: T = parse(key, expected, value)?;
    if parsed == T::default() {
        return Err(ConfigError::Invalid {
            key,
            expected,
            value: value.to_string(),
        });
    }
    Ok(parsed)
}
