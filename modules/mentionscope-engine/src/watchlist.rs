// Keyword watchlist: terms a caller wants re-run on demand. Injected wherever
// it's needed; there is no process-wide instance.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mentionscope_common::{SearchRequest, SourceName};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::PersistenceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedKeyword {
    pub term: String,
    pub sources: Vec<SourceName>,
    pub region: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl WatchedKeyword {
    pub fn new(term: impl Into<String>, sources: impl IntoIterator<Item = SourceName>) -> Self {
        Self {
            term: term.into(),
            sources: sources.into_iter().collect(),
            region: None,
            added_at: Utc::now(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// The search this watch entry stands for.
    pub fn to_request(&self) -> SearchRequest {
        let request = SearchRequest::new(self.term.clone(), self.sources.iter().copied());
        match &self.region {
            Some(region) => request.region(region.clone()),
            None => request,
        }
    }

    fn key(&self) -> String {
        self.term.trim().to_lowercase()
    }
}

#[async_trait]
pub trait KeywordWatchStore: Send + Sync {
    async fn load(&self) -> Result<Vec<WatchedKeyword>, PersistenceError>;

    /// Replace the stored list.
    async fn save(&self, keywords: &[WatchedKeyword]) -> Result<(), PersistenceError>;
}

/// Add or replace one entry (terms compare case-insensitively).
pub async fn add_keyword(
    store: &dyn KeywordWatchStore,
    keyword: WatchedKeyword,
) -> Result<(), PersistenceError> {
    let mut keywords = store.load().await?;
    keywords.retain(|k| k.key() != keyword.key());
    keywords.push(keyword);
    store.save(&keywords).await
}

/// Remove an entry by term. Returns whether anything was removed.
pub async fn remove_keyword(
    store: &dyn KeywordWatchStore,
    term: &str,
) -> Result<bool, PersistenceError> {
    let key = term.trim().to_lowercase();
    let mut keywords = store.load().await?;
    let before = keywords.len();
    keywords.retain(|k| k.key() != key);
    if keywords.len() == before {
        return Ok(false);
    }
    store.save(&keywords).await?;
    Ok(true)
}

#[derive(Default)]
pub struct MemoryWatchStore {
    keywords: RwLock<Vec<WatchedKeyword>>,
}

impl MemoryWatchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeywordWatchStore for MemoryWatchStore {
    async fn load(&self) -> Result<Vec<WatchedKeyword>, PersistenceError> {
        Ok(self.keywords.read().await.clone())
    }

    async fn save(&self, keywords: &[WatchedKeyword]) -> Result<(), PersistenceError> {
        *self.keywords.write().await = keywords.to_vec();
        Ok(())
    }
}

/// Postgres-backed watchlist. Migrations are applied by `PgGateway`.
#[derive(Clone)]
pub struct PgWatchStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct WatchRow {
    term: String,
    sources: serde_json::Value,
    region: Option<String>,
    added_at: DateTime<Utc>,
}

impl PgWatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeywordWatchStore for PgWatchStore {
    async fn load(&self) -> Result<Vec<WatchedKeyword>, PersistenceError> {
        let rows = sqlx::query_as::<_, WatchRow>(
            r#"
            SELECT term, sources, region, added_at
            FROM keyword_watchlist
            ORDER BY added_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<WatchedKeyword, PersistenceError> {
                Ok(WatchedKeyword {
                    term: row.term,
                    sources: serde_json::from_value(row.sources)?,
                    region: row.region,
                    added_at: row.added_at,
                })
            })
            .collect()
    }

    async fn save(&self, keywords: &[WatchedKeyword]) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM keyword_watchlist")
            .execute(&mut *tx)
            .await?;

        for keyword in keywords {
            sqlx::query(
                r#"
                INSERT INTO keyword_watchlist (term_key, term, sources, region, added_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (term_key) DO UPDATE
                SET term = EXCLUDED.term,
                    sources = EXCLUDED.sources,
                    region = EXCLUDED.region,
                    added_at = EXCLUDED.added_at
                "#,
            )
            .bind(keyword.key())
            .bind(&keyword.term)
            .bind(serde_json::to_value(&keyword.sources)?)
            .bind(&keyword.region)
            .bind(keyword.added_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(count = keywords.len(), "Saved keyword watchlist");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_request_carries_term_sources_and_region() {
        let keyword =
            WatchedKeyword::new("measles", [SourceName::TikTok, SourceName::Web]).with_region("TX");
        let request = keyword.to_request();
        assert_eq!(request.term, "measles");
        assert_eq!(request.sources, vec![SourceName::TikTok, SourceName::Web]);
        assert_eq!(request.region.as_deref(), Some("TX"));
        assert!(request.validate().is_ok());
    }

    #[tokio::test]
    async fn add_replaces_same_term() {
        let store = MemoryWatchStore::new();
        add_keyword(&store, WatchedKeyword::new("Flood", [SourceName::Twitter]))
            .await
            .unwrap();
        add_keyword(&store, WatchedKeyword::new("flood ", [SourceName::YouTube]))
            .await
            .unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].sources, vec![SourceName::YouTube]);
    }

    #[tokio::test]
    async fn remove_reports_whether_anything_changed() {
        let store = MemoryWatchStore::new();
        add_keyword(&store, WatchedKeyword::new("heat", [SourceName::Facebook]))
            .await
            .unwrap();
        assert!(!remove_keyword(&store, "cold").await.unwrap());
        assert!(remove_keyword(&store, "HEAT").await.unwrap());
        assert!(store.load().await.unwrap().is_empty());
    }
}
