// Instagram source: hashtag search. Instagram has no free-text search, so the
// term is folded into a single hashtag first.

use apify_client::ApifyClient;
use async_trait::async_trait;
use mentionscope_common::SourceName;
use tracing::{info, warn};

use super::{RawPayload, SourceClient, SourceQuery};
use crate::error::SourceError;

pub struct InstagramSource {
    client: ApifyClient,
}

impl InstagramSource {
    pub fn new(client: ApifyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceClient for InstagramSource {
    fn name(&self) -> SourceName {
        SourceName::Instagram
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<RawPayload, SourceError> {
        let Some(hashtag) = sanitize_term_to_hashtag(&query.term) else {
            warn!(term = %query.term, "instagram: term has no hashtag-safe characters");
            return Ok(RawPayload::Array(Vec::new()));
        };

        info!(%hashtag, limit = query.limit, "instagram: searching hashtag");
        Ok(self
            .client
            .search_instagram_hashtags(&[hashtag.as_str()], query.limit)
            .await?)
    }
}

/// Convert a multi-word term into a valid Instagram hashtag (camelCase,
/// alphanumeric only). The hashtag API rejects spaces, punctuation and a
/// leading `#`. Returns `None` if nothing usable is left.
pub fn sanitize_term_to_hashtag(term: &str) -> Option<String> {
    let tag: String = term
        .split_whitespace()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|w| !w.is_empty())
        .enumerate()
        .map(|(i, w)| {
            if i == 0 {
                w.to_lowercase()
            } else {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().to_string() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            }
        })
        .collect();

    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_multi_word_term() {
        assert_eq!(
            sanitize_term_to_hashtag("Covid vaccine side effects").as_deref(),
            Some("covidVaccineSideEffects")
        );
    }

    #[test]
    fn sanitize_strips_hash_and_punctuation() {
        assert_eq!(
            sanitize_term_to_hashtag("#Flood: warning - 2026!").as_deref(),
            Some("floodWarning2026")
        );
    }

    #[test]
    fn sanitize_punctuation_only_is_none() {
        assert_eq!(sanitize_term_to_hashtag("!!! ???"), None);
    }
}
