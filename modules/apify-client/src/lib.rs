pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    FacebookSearchInput, InstagramHashtagInput, TikTokSearchInput, TweetSearchInput,
    YouTubeSearchInput,
};

use serde::Serialize;
use serde_json::Value;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for clockworks/tiktok-scraper.
const TIKTOK_SCRAPER: &str = "GdWCkxBtKWOsKjdch";

/// Actor ID for apify/instagram-hashtag-scraper.
const INSTAGRAM_HASHTAG_SCRAPER: &str = "reGe1ST3OBgYZSsZJ";

/// Actor ID for apidojo/tweet-scraper.
const TWEET_SCRAPER: &str = "61RPP7dywgiy0JPD0";

/// Facebook keyword search actor, addressed by `username~actor-name`.
const FACEBOOK_SEARCH_SCRAPER: &str = "apify~facebook-search-scraper";

/// Actor ID for streamers/youtube-scraper.
const YOUTUBE_SCRAPER: &str = "h7sDV53CddomktSi5";

/// Thin client over the Apify actor API.
///
/// Every search runs an actor synchronously through
/// `run-sync-get-dataset-items`: one POST carrying the actor input, with the
/// dataset items returned as the response body. Payloads come back as raw
/// JSON because each actor's output schema is vendor-owned and drifts.
#[derive(Clone)]
pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (local fakes, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a caller-configured reqwest client (timeouts, proxies).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Run an actor to completion and return its dataset items as raw JSON.
    ///
    /// Non-2xx responses and bodies that are not valid JSON are errors.
    /// An empty dataset is a successful `[]`.
    pub async fn run_actor_sync<I: Serialize + ?Sized>(
        &self,
        actor_id: &str,
        input: &I,
    ) -> Result<Value> {
        let url = format!(
            "{}/acts/{}/run-sync-get-dataset-items?format=json",
            self.base_url, actor_id
        );
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let items: Value = serde_json::from_str(&body)?;
        Ok(items)
    }

    /// Search TikTok videos by keyword.
    pub async fn search_tiktok_keywords(&self, keywords: &[&str], limit: u32) -> Result<Value> {
        tracing::info!(?keywords, limit, "Starting TikTok keyword search");

        let input = TikTokSearchInput {
            search_queries: keywords.iter().map(|k| k.to_string()).collect(),
            results_per_page: limit,
            search_section: Some("/video".to_string()),
        };
        self.run_actor_sync(TIKTOK_SCRAPER, &input).await
    }

    /// Search Instagram posts by hashtag. Hashtags must already be sanitized.
    pub async fn search_instagram_hashtags(&self, hashtags: &[&str], limit: u32) -> Result<Value> {
        tracing::info!(?hashtags, limit, "Starting Instagram hashtag search");

        let input = InstagramHashtagInput {
            hashtags: hashtags.iter().map(|h| h.to_string()).collect(),
            results_limit: limit,
        };
        self.run_actor_sync(INSTAGRAM_HASHTAG_SCRAPER, &input).await
    }

    /// Search X/Twitter by keyword, optionally restricted to one language.
    pub async fn search_x_keywords(
        &self,
        terms: &[&str],
        limit: u32,
        language: Option<&str>,
    ) -> Result<Value> {
        tracing::info!(?terms, limit, ?language, "Starting X/Twitter keyword search");

        let input = TweetSearchInput {
            search_terms: terms.iter().map(|t| t.to_string()).collect(),
            max_items: limit,
            tweet_language: language.map(str::to_string),
        };
        self.run_actor_sync(TWEET_SCRAPER, &input).await
    }

    /// Search public Facebook posts by keyword.
    pub async fn search_facebook_keywords(
        &self,
        keywords: &[&str],
        limit: u32,
        location: Option<&str>,
    ) -> Result<Value> {
        tracing::info!(?keywords, limit, ?location, "Starting Facebook keyword search");

        let input = FacebookSearchInput {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            max_results: limit,
            location: location.map(str::to_string),
        };
        self.run_actor_sync(FACEBOOK_SEARCH_SCRAPER, &input).await
    }

    /// Search YouTube videos by keyword.
    pub async fn search_youtube(
        &self,
        queries: &[&str],
        limit: u32,
        language: Option<&str>,
    ) -> Result<Value> {
        tracing::info!(?queries, limit, ?language, "Starting YouTube search");

        let input = YouTubeSearchInput {
            search_queries: queries.iter().map(|q| q.to_string()).collect(),
            max_results: limit,
            language: language.map(str::to_string),
        };
        self.run_actor_sync(YOUTUBE_SCRAPER, &input).await
    }
}
