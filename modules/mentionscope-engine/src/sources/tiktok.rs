// TikTok source: keyword video search.
// Wraps ApifyClient, returns the raw dataset.

use apify_client::ApifyClient;
use async_trait::async_trait;
use mentionscope_common::SourceName;
use tracing::info;

use super::{RawPayload, SourceClient, SourceQuery};
use crate::error::SourceError;

pub struct TikTokSource {
    client: ApifyClient,
}

impl TikTokSource {
    pub fn new(client: ApifyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceClient for TikTokSource {
    fn name(&self) -> SourceName {
        SourceName::TikTok
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<RawPayload, SourceError> {
        info!(term = %query.term, limit = query.limit, "tiktok: searching keywords");
        Ok(self
            .client
            .search_tiktok_keywords(&[query.term.as_str()], query.limit)
            .await?)
    }
}
