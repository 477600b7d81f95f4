// Aggregation orchestrator. Fans one search out to every requested source
// concurrently, normalizes what comes back, fills failed or empty sources
// with fallback rows, and rolls the merged list up into metrics.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use mentionscope_common::{
    AggregationResult, BatchId, Config, EngagementRecord, NewBatch, Permissions, RollupMetrics,
    SearchRequest, Severity, SortOrder, SourceName, SourceStatus, ValidationError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::classify::{FixedRatioEstimator, SentimentEstimator};
use crate::error::{PersistenceError, RunError, SourceError};
use crate::fallback::{FallbackGenerator, FallbackRequest};
use crate::normalize::{Normalized, Normalizer};
use crate::sources::{SourceQuery, SourceRegistry};
use crate::store::PersistenceGateway;
use crate::watchlist::KeywordWatchStore;

/// Tunables for one aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Budget for each source call, independently.
    pub source_timeout: Duration,
    /// Upper bound on the per-source result limit.
    pub max_results: u32,
    /// Synthetic rows generated for each failed or empty source.
    pub fallback_per_source: usize,
    /// Fixed seed for fallback data. `None` draws from OS entropy per run.
    pub fallback_seed: Option<u64>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(20),
            max_results: 100,
            fallback_per_source: 5,
            fallback_seed: None,
        }
    }
}

impl From<&Config> for AggregatorConfig {
    fn from(config: &Config) -> Self {
        Self {
            source_timeout: config.source_timeout,
            max_results: config.max_results,
            fallback_per_source: config.fallback_per_source,
            fallback_seed: config.fallback_seed,
        }
    }
}

/// A run plus the outcome of saving it. Storage failure leaves the result intact.
#[derive(Debug)]
pub struct PersistedRun {
    pub result: AggregationResult,
    pub batch_id: Option<BatchId>,
    pub persistence_error: Option<PersistenceError>,
}

pub struct Aggregator {
    registry: SourceRegistry,
    config: AggregatorConfig,
    estimator: Arc<dyn SentimentEstimator>,
    clock: fn() -> DateTime<Utc>,
}

impl Aggregator {
    pub fn new(registry: SourceRegistry, config: AggregatorConfig) -> Self {
        Self {
            registry,
            config,
            estimator: Arc::new(FixedRatioEstimator::default()),
            clock: Utc::now,
        }
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn SentimentEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Override the observation clock (tests pin it for reproducible output).
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Run one search. Only a malformed request is an error; every source
    /// failure is folded into the result.
    pub async fn run(&self, request: &SearchRequest) -> Result<AggregationResult, ValidationError> {
        self.run_with_cancel(request, &CancellationToken::new()).await
    }

    /// Like [`run`](Self::run), but every in-flight source call stops as soon
    /// as `cancel` fires. Cancelled sources are reported as errors.
    pub async fn run_with_cancel(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<AggregationResult, ValidationError> {
        request.validate()?;

        let observed_at = (self.clock)();
        let query = SourceQuery::from_request(request, self.config.max_results);
        let sources = request.distinct_sources();
        let normalizer = Normalizer::new(observed_at).with_estimator(self.estimator.clone());

        info!(
            term = %query.term,
            sources = sources.len(),
            limit = query.limit,
            "Aggregation started"
        );

        let outcomes = join_all(sources.iter().map(|&source| {
            let query = &query;
            let normalizer = &normalizer;
            async move {
                let outcome = self
                    .collect_source(source, query, normalizer, request.severity_filter, cancel)
                    .await;
                (source, outcome)
            }
        }))
        .await;

        let mut rng = match self.config.fallback_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let fallback = FallbackGenerator::new(self.estimator.clone());

        let mut records = Vec::new();
        let mut per_source_status = BTreeMap::new();
        let mut source_errors = BTreeMap::new();

        for (source, outcome) in outcomes {
            let status = match outcome {
                // Live rows exist, so no fallback even if the filter kept none.
                Ok(live) if live.normalized > 0 => {
                    records.extend(live.records);
                    per_source_status.insert(source, SourceStatus::Ok);
                    continue;
                }
                Ok(_) => SourceStatus::Empty,
                Err(e) => {
                    warn!(source = %source, error = %e, "Source failed, using fallback data");
                    source_errors.insert(source, e.to_string());
                    SourceStatus::Error
                }
            };
            per_source_status.insert(source, status);

            records.extend(fallback.generate(
                &mut rng,
                FallbackRequest {
                    term: &query.term,
                    source,
                    region: query.region.as_deref(),
                    count: self.config.fallback_per_source,
                    observed_at,
                    window: request.window,
                    min_severity: request.severity_filter,
                },
            ));
        }

        if let Some(sort) = request.sort {
            sort_records(&mut records, sort);
        }

        let metrics = RollupMetrics::from_records(&records);

        info!(
            term = %query.term,
            total = metrics.total_mentions,
            fallback = metrics.fallback_mentions,
            failed = source_errors.len(),
            "Aggregation complete"
        );

        Ok(AggregationResult {
            term: query.term,
            observed_at,
            records,
            metrics,
            per_source_status,
            source_errors,
        })
    }

    /// Caller-side gate: refuse unless the caller may search.
    pub async fn run_authorized(
        &self,
        permissions: &Permissions,
        request: &SearchRequest,
    ) -> Result<AggregationResult, RunError> {
        permissions.require_search()?;
        Ok(self.run(request).await?)
    }

    /// Run, then save the merged batch. A failed save is returned next to the
    /// result as a warning.
    pub async fn run_and_persist(
        &self,
        request: &SearchRequest,
        gateway: &dyn PersistenceGateway,
    ) -> Result<PersistedRun, ValidationError> {
        let result = self.run(request).await?;
        let sources = request.distinct_sources();

        let saved = gateway
            .save(NewBatch {
                term: &result.term,
                sources: &sources,
                records: &result.records,
                metrics: &result.metrics,
            })
            .await;

        Ok(match saved {
            Ok(batch_id) => PersistedRun {
                result,
                batch_id: Some(batch_id),
                persistence_error: None,
            },
            Err(e) => {
                warn!(term = %result.term, error = %e, "Failed to persist aggregation batch");
                PersistedRun {
                    result,
                    batch_id: None,
                    persistence_error: Some(e),
                }
            }
        })
    }

    /// Run every watched keyword in turn. Invalid entries are skipped.
    pub async fn run_watchlist(
        &self,
        store: &dyn KeywordWatchStore,
    ) -> Result<Vec<AggregationResult>, PersistenceError> {
        let keywords = store.load().await?;
        let mut results = Vec::with_capacity(keywords.len());
        for keyword in &keywords {
            match self.run(&keyword.to_request()).await {
                Ok(result) => results.push(result),
                Err(e) => warn!(term = %keyword.term, error = %e, "Skipping watched keyword"),
            }
        }
        Ok(results)
    }

    /// One source, start to finish: fetch under the timeout and the
    /// cancellation token, normalize, then apply the severity filter.
    async fn collect_source(
        &self,
        source: SourceName,
        query: &SourceQuery,
        normalizer: &Normalizer,
        severity_filter: Option<Severity>,
        cancel: &CancellationToken,
    ) -> Result<Normalized, SourceError> {
        let client = self
            .registry
            .get(source)
            .ok_or(SourceError::NotConfigured(source))?;

        let timeout = self.config.source_timeout;
        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SourceError::Cancelled),
            fetched = tokio::time::timeout(timeout, client.fetch(query)) => {
                fetched.map_err(|_| SourceError::Timeout(timeout))??
            }
        };

        let normalized = normalizer.normalize_filtered(&raw, source, &query.term, severity_filter);
        info!(
            source = %source,
            fetched = normalized.normalized,
            kept = normalized.records.len(),
            "Source collected"
        );
        Ok(normalized)
    }
}

/// Stable, so ties keep merge order.
fn sort_records(records: &mut [EngagementRecord], sort: SortOrder) {
    match sort {
        SortOrder::Newest => records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        SortOrder::MostEngagement => {
            records.sort_by(|a, b| b.counts.engagement().cmp(&a.counts.engagement()))
        }
    }
}
