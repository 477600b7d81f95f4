use serde::Serialize;

// Actor inputs. Each scraper actor owns its own input schema; field names
// follow the actor's documented JSON keys.

/// Input for the clockworks/tiktok-scraper actor (keyword search).
#[derive(Debug, Clone, Serialize)]
pub struct TikTokSearchInput {
    #[serde(rename = "searchQueries")]
    pub search_queries: Vec<String>,
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: u32,
    #[serde(rename = "searchSection", skip_serializing_if = "Option::is_none")]
    pub search_section: Option<String>,
}

/// Input for the apify/instagram-hashtag-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct InstagramHashtagInput {
    pub hashtags: Vec<String>,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
}

/// Input for X/Twitter keyword search via apidojo/tweet-scraper.
#[derive(Debug, Clone, Serialize)]
pub struct TweetSearchInput {
    #[serde(rename = "searchTerms")]
    pub search_terms: Vec<String>,
    #[serde(rename = "maxItems")]
    pub max_items: u32,
    #[serde(rename = "tweetLanguage", skip_serializing_if = "Option::is_none")]
    pub tweet_language: Option<String>,
}

/// Input for the Facebook keyword post search actor.
#[derive(Debug, Clone, Serialize)]
pub struct FacebookSearchInput {
    pub keywords: Vec<String>,
    #[serde(rename = "maxResults")]
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Input for the streamers/youtube-scraper actor (search mode).
#[derive(Debug, Clone, Serialize)]
pub struct YouTubeSearchInput {
    #[serde(rename = "searchQueries")]
    pub search_queries: Vec<String>,
    #[serde(rename = "maxResults")]
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}
