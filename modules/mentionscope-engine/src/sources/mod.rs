// Per-platform source clients. Each one knows how to ask a single vendor for
// mentions of a term and hands back the vendor's raw JSON untouched. Shape
// handling lives in `normalize`; these have no storage dependency.

mod facebook;
mod instagram;
mod tiktok;
mod twitter;
mod web;
mod youtube;

pub use facebook::FacebookSource;
pub use instagram::{sanitize_term_to_hashtag, InstagramSource};
pub use tiktok::TikTokSource;
pub use twitter::TwitterSource;
pub use web::WebSource;
pub use youtube::YouTubeSource;

use std::collections::HashMap;
use std::sync::Arc;

use apify_client::ApifyClient;
use async_trait::async_trait;
use mentionscope_common::{Config, SearchRequest, SourceName};
use tracing::info;

use crate::error::SourceError;

/// A vendor's response body, shape unknown until normalized.
pub type RawPayload = serde_json::Value;

/// What every source is asked for on one aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    pub term: String,
    pub region: Option<String>,
    pub language: Option<String>,
    /// Vendor-side result budget derived from the request window.
    pub limit: u32,
}

impl SourceQuery {
    pub fn from_request(request: &SearchRequest, max_results: u32) -> Self {
        Self {
            term: request.term.trim().to_string(),
            region: request.region.clone().filter(|r| !r.trim().is_empty()),
            language: request.language.clone().filter(|l| !l.trim().is_empty()),
            limit: request.window.result_limit().min(max_results).max(1),
        }
    }
}

/// One external search API.
///
/// Implementations must be stateless and safe to call concurrently. Zero
/// results is `Ok` with an empty payload; only transport failures (non-2xx,
/// network errors, malformed JSON) are errors.
#[async_trait]
pub trait SourceClient: Send + Sync {
    fn name(&self) -> SourceName;

    async fn fetch(&self, query: &SourceQuery) -> Result<RawPayload, SourceError>;
}

/// The clients available to an aggregator, keyed by source.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    clients: HashMap<SourceName, Arc<dyn SourceClient>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client under its own name, replacing any previous one.
    pub fn with(mut self, client: Arc<dyn SourceClient>) -> Self {
        self.insert(client);
        self
    }

    pub fn insert(&mut self, client: Arc<dyn SourceClient>) {
        self.clients.insert(client.name(), client);
    }

    pub fn get(&self, source: SourceName) -> Option<&Arc<dyn SourceClient>> {
        self.clients.get(&source)
    }

    pub fn contains(&self, source: SourceName) -> bool {
        self.clients.contains_key(&source)
    }

    /// Registered sources in canonical order.
    pub fn names(&self) -> Vec<SourceName> {
        SourceName::ALL
            .into_iter()
            .filter(|s| self.clients.contains_key(s))
            .collect()
    }

    /// Build the vendor-backed registry from configuration. Sources whose
    /// credentials are missing are left out.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();

        // Social sources (all require Apify)
        if let Some(ref api_key) = config.apify_api_key {
            let http = reqwest::Client::builder()
                .timeout(config.source_timeout)
                .build()
                .unwrap_or_default();
            let apify = ApifyClient::new(api_key.clone()).with_http_client(http);
            registry.insert(Arc::new(TikTokSource::new(apify.clone())));
            registry.insert(Arc::new(InstagramSource::new(apify.clone())));
            registry.insert(Arc::new(TwitterSource::new(apify.clone())));
            registry.insert(Arc::new(FacebookSource::new(apify.clone())));
            registry.insert(Arc::new(YouTubeSource::new(apify)));
        }

        // Web search
        if let Some(ref api_key) = config.serper_api_key {
            registry.insert(Arc::new(WebSource::new(api_key, config.source_timeout)));
        }

        info!(sources = ?registry.names(), "Source registry built");
        registry
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use mentionscope_common::TimeWindow;

    #[test]
    fn query_limit_follows_window_and_cap() {
        let req = SearchRequest::new(" covid ", [SourceName::TikTok]).window(TimeWindow::Quarter);
        let query = SourceQuery::from_request(&req, 40);
        assert_eq!(query.term, "covid");
        assert_eq!(query.limit, 40);

        let req = req.window(TimeWindow::Day);
        assert_eq!(SourceQuery::from_request(&req, 40).limit, 10);
    }

    #[test]
    fn blank_locale_hints_are_dropped() {
        let req = SearchRequest::new("covid", [SourceName::Web])
            .region("  ")
            .language("en");
        let query = SourceQuery::from_request(&req, 100);
        assert_eq!(query.region, None);
        assert_eq!(query.language.as_deref(), Some("en"));
    }

    #[test]
    fn registry_without_keys_is_empty() {
        let registry = SourceRegistry::from_config(&Config::default());
        assert!(registry.names().is_empty());
    }

    #[test]
    fn registry_with_apify_key_covers_social_sources() {
        let config = Config {
            apify_api_key: Some("key".into()),
            source_timeout: Duration::from_secs(5),
            ..Config::default()
        };
        let registry = SourceRegistry::from_config(&config);
        assert_eq!(
            registry.names(),
            vec![
                SourceName::TikTok,
                SourceName::Instagram,
                SourceName::Twitter,
                SourceName::Facebook,
                SourceName::YouTube,
            ]
        );
        assert!(!registry.contains(SourceName::Web));
    }
}
