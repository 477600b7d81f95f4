// Persistence of merged aggregation batches. Best-effort from the
// aggregator's point of view: a failed save is reported, never fatal.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mentionscope_common::{BatchId, NewBatch, PersistedBatch};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::PersistenceError;

/// Where merged batches go.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn save(&self, batch: NewBatch<'_>) -> Result<BatchId, PersistenceError>;

    /// Batches whose term matches case-insensitively, newest first.
    async fn query_by_term(&self, term: &str) -> Result<Vec<PersistedBatch>, PersistenceError>;
}

fn term_key(term: &str) -> String {
    term.trim().to_lowercase()
}

// --- In-memory ---

/// Process-local gateway for tests and the dev binary.
#[derive(Default)]
pub struct MemoryGateway {
    batches: RwLock<Vec<PersistedBatch>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.batches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.batches.read().await.is_empty()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn save(&self, batch: NewBatch<'_>) -> Result<BatchId, PersistenceError> {
        let id = BatchId(Uuid::new_v4());
        self.batches.write().await.push(PersistedBatch {
            id,
            term: batch.term.to_string(),
            sources: batch.sources.to_vec(),
            records: batch.records.to_vec(),
            metrics: batch.metrics.clone(),
            saved_at: Utc::now(),
        });
        Ok(id)
    }

    async fn query_by_term(&self, term: &str) -> Result<Vec<PersistedBatch>, PersistenceError> {
        let key = term_key(term);
        let batches = self.batches.read().await;
        Ok(batches
            .iter()
            .rev()
            .filter(|b| term_key(&b.term) == key)
            .cloned()
            .collect())
    }
}

// --- Postgres ---

/// Postgres gateway. Records, sources and metrics are stored as JSONB so
/// every field, provenance included, reads back unchanged.
#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct BatchRow {
    id: Uuid,
    term: String,
    sources: serde_json::Value,
    records: serde_json::Value,
    metrics: serde_json::Value,
    saved_at: DateTime<Utc>,
}

impl TryFrom<BatchRow> for PersistedBatch {
    type Error = PersistenceError;

    fn try_from(row: BatchRow) -> Result<Self, Self::Error> {
        Ok(PersistedBatch {
            id: BatchId(row.id),
            term: row.term,
            sources: serde_json::from_value(row.sources)?,
            records: serde_json::from_value(row.records)?,
            metrics: serde_json::from_value(row.metrics)?,
            saved_at: row.saved_at,
        })
    }
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with a small pool and apply migrations.
    pub async fn connect(database_url: &str) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let gateway = Self::new(pool);
        gateway.migrate().await?;
        Ok(gateway)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<(), PersistenceError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for PgGateway {
    async fn save(&self, batch: NewBatch<'_>) -> Result<BatchId, PersistenceError> {
        let sources = serde_json::to_value(batch.sources)?;
        let records = serde_json::to_value(batch.records)?;
        let metrics = serde_json::to_value(batch.metrics)?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO aggregation_batches (id, term, term_key, sources, records, metrics)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(batch.term)
        .bind(term_key(batch.term))
        .bind(&sources)
        .bind(&records)
        .bind(&metrics)
        .fetch_one(&self.pool)
        .await?;

        info!(
            batch_id = %id,
            term = batch.term,
            records = batch.records.len(),
            "Saved aggregation batch"
        );
        Ok(BatchId(id))
    }

    async fn query_by_term(&self, term: &str) -> Result<Vec<PersistedBatch>, PersistenceError> {
        let rows = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT id, term, sources, records, metrics, saved_at
            FROM aggregation_batches
            WHERE term_key = $1
            ORDER BY saved_at DESC
            "#,
        )
        .bind(term_key(term))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PersistedBatch::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use mentionscope_common::{RollupMetrics, SourceName};

    use super::*;

    #[tokio::test]
    async fn memory_gateway_matches_terms_case_insensitively() {
        let gateway = MemoryGateway::new();
        let metrics = RollupMetrics::default();
        let batch = |term| NewBatch {
            term,
            sources: &[SourceName::TikTok],
            records: &[],
            metrics: &metrics,
        };

        let first = gateway.save(batch("Covid")).await.unwrap();
        gateway.save(batch("flu")).await.unwrap();
        let second = gateway.save(batch(" covid ")).await.unwrap();

        let found = gateway.query_by_term("COVID").await.unwrap();
        let ids: Vec<_> = found.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(gateway.len().await, 3);
    }

    #[tokio::test]
    async fn unknown_term_is_empty() {
        let gateway = MemoryGateway::new();
        assert!(gateway.query_by_term("nothing").await.unwrap().is_empty());
        assert!(gateway.is_empty().await);
    }
}
