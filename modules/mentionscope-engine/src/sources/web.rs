// Generic web source (Serper / Google Search).

use std::time::Duration;

use async_trait::async_trait;
use mentionscope_common::SourceName;
use tracing::info;

use super::{RawPayload, SourceClient, SourceQuery};
use crate::error::SourceError;

const SERPER_URL: &str = "https://google.serper.dev/search";

pub struct WebSource {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl WebSource {
    pub fn new(api_key: &str, timeout: Duration) -> Self {
        Self {
            api_key: api_key.to_string(),
            endpoint: SERPER_URL.to_string(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Point the source at a different search endpoint (local fakes).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Serper request body. A two-letter region is a country code and goes to
/// `gl`; anything longer is appended to the query text instead.
pub(crate) fn search_body(query: &SourceQuery) -> serde_json::Value {
    let mut body = serde_json::json!({
        "q": query.term,
        "num": query.limit,
    });

    if let Some(region) = query.region.as_deref().map(str::trim) {
        if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) {
            body["gl"] = serde_json::Value::String(region.to_lowercase());
        } else {
            body["q"] = serde_json::Value::String(format!("{} {}", query.term, region));
        }
    }
    if let Some(language) = query.language.as_deref() {
        body["hl"] = serde_json::Value::String(language.to_string());
    }
    body
}

#[async_trait]
impl SourceClient for WebSource {
    fn name(&self) -> SourceName {
        SourceName::Web
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<RawPayload, SourceError> {
        info!(term = %query.term, limit = query.limit, "web: querying serper");

        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&search_body(query))
            .send()
            .await?
            .error_for_status()?;

        let body = resp.text().await?;
        let payload: RawPayload = serde_json::from_str(&body)?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(region: Option<&str>) -> SourceQuery {
        SourceQuery {
            term: "covid".into(),
            region: region.map(str::to_string),
            language: Some("en".into()),
            limit: 10,
        }
    }

    #[test]
    fn country_code_region_goes_to_gl() {
        let body = search_body(&query(Some("US")));
        assert_eq!(body["gl"], "us");
        assert_eq!(body["q"], "covid");
        assert_eq!(body["hl"], "en");
        assert_eq!(body["num"], 10);
    }

    #[test]
    fn free_form_region_is_appended_to_query() {
        let body = search_body(&query(Some("Lagos")));
        assert_eq!(body["q"], "covid Lagos");
        assert!(body.get("gl").is_none());
    }
}
