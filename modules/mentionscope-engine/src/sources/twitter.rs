// Twitter/X source: keyword search, language-filtered when a hint is given.

use apify_client::ApifyClient;
use async_trait::async_trait;
use mentionscope_common::SourceName;
use tracing::info;

use super::{RawPayload, SourceClient, SourceQuery};
use crate::error::SourceError;

pub struct TwitterSource {
    client: ApifyClient,
}

impl TwitterSource {
    pub fn new(client: ApifyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceClient for TwitterSource {
    fn name(&self) -> SourceName {
        SourceName::Twitter
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<RawPayload, SourceError> {
        info!(term = %query.term, limit = query.limit, "twitter: searching keywords");
        Ok(self
            .client
            .search_x_keywords(
                &[query.term.as_str()],
                query.limit,
                query.language.as_deref(),
            )
            .await?)
    }
}
