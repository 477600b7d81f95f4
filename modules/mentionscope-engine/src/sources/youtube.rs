// YouTube source: video search.

use apify_client::ApifyClient;
use async_trait::async_trait;
use mentionscope_common::SourceName;
use tracing::info;

use super::{RawPayload, SourceClient, SourceQuery};
use crate::error::SourceError;

pub struct YouTubeSource {
    client: ApifyClient,
}

impl YouTubeSource {
    pub fn new(client: ApifyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceClient for YouTubeSource {
    fn name(&self) -> SourceName {
        SourceName::YouTube
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<RawPayload, SourceError> {
        info!(term = %query.term, limit = query.limit, "youtube: searching videos");
        Ok(self
            .client
            .search_youtube(
                &[query.term.as_str()],
                query.limit,
                query.language.as_deref(),
            )
            .await?)
    }
}
