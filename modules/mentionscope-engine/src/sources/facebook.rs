// Facebook source: public post keyword search. The region hint is passed as
// the actor's location filter.

use apify_client::ApifyClient;
use async_trait::async_trait;
use mentionscope_common::SourceName;
use tracing::info;

use super::{RawPayload, SourceClient, SourceQuery};
use crate::error::SourceError;

pub struct FacebookSource {
    client: ApifyClient,
}

impl FacebookSource {
    pub fn new(client: ApifyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceClient for FacebookSource {
    fn name(&self) -> SourceName {
        SourceName::Facebook
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<RawPayload, SourceError> {
        info!(
            term = %query.term,
            limit = query.limit,
            region = ?query.region,
            "facebook: searching keywords"
        );
        Ok(self
            .client
            .search_facebook_keywords(
                &[query.term.as_str()],
                query.limit,
                query.region.as_deref(),
            )
            .await?)
    }
}
