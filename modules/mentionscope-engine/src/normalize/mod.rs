// Result normalization: vendor JSON of any known shape in, canonical
// `EngagementRecord`s out. No I/O and no randomness.

pub mod envelope;
pub mod fields;
pub mod link;
pub mod timestamp;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mentionscope_common::{
    Counts, Derived, EngagementRecord, Provenance, Sentiment, Severity, SourceName,
};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::classify::{classify_severity, FixedRatioEstimator, SentimentEstimator};

pub use envelope::{resolve, Envelope, ENVELOPES};
pub use link::canonicalize_url;
pub use timestamp::parse_timestamp;

/// Namespace for ids derived from record content when the vendor gives none.
const RECORD_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6d1f_3c2a_8b4e_4f0a_9c7d_2e5b_1a3f_8c60);

/// One payload after normalization and severity filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    /// Rows that survived the filter.
    pub records: Vec<EngagementRecord>,
    /// Rows the payload produced before filtering.
    pub normalized: usize,
}

/// Maps raw payloads to records. The observation time is fixed at
/// construction so the same input always produces the same output.
#[derive(Clone)]
pub struct Normalizer {
    observed_at: DateTime<Utc>,
    estimator: Arc<dyn SentimentEstimator>,
}

impl Normalizer {
    pub fn new(observed_at: DateTime<Utc>) -> Self {
        Self {
            observed_at,
            estimator: Arc::new(FixedRatioEstimator::default()),
        }
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn SentimentEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Normalize one source's payload. An unrecognized shape yields no
    /// records, never an error.
    pub fn normalize(&self, raw: &Value, source: SourceName, term: &str) -> Vec<EngagementRecord> {
        self.normalize_filtered(raw, source, term, None).records
    }

    /// Normalize, then keep only records at or above `min_severity`.
    /// Sentiment is labelled over the kept rows, so the split follows the
    /// volume the caller actually sees.
    pub fn normalize_filtered(
        &self,
        raw: &Value,
        source: SourceName,
        term: &str,
        min_severity: Option<Severity>,
    ) -> Normalized {
        let Some((envelope, items)) = resolve(raw) else {
            debug!(source = %source, "No known envelope in payload");
            return Normalized::default();
        };

        let mut records: Vec<EngagementRecord> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_object())
            .map(|(position, item)| self.normalize_item(item, position, source, term))
            .collect();
        if records.len() < items.len() {
            debug!(
                source = %source,
                skipped = items.len() - records.len(),
                "Skipped non-object items"
            );
        }

        let normalized = records.len();
        if let Some(min) = min_severity {
            records.retain(|r| r.derived.severity >= min);
        }

        let split = self.estimator.estimate(records.len());
        for (record, sentiment) in records.iter_mut().zip(split.labels()) {
            record.derived.sentiment = sentiment;
        }

        debug!(
            source = %source,
            envelope = ?envelope,
            normalized,
            kept = records.len(),
            "Normalized payload"
        );
        Normalized {
            records,
            normalized,
        }
    }

    fn normalize_item(
        &self,
        item: &Value,
        position: usize,
        source: SourceName,
        term: &str,
    ) -> EngagementRecord {
        let content = fields::first_str(item, fields::CONTENT)
            .unwrap_or_default()
            .to_string();
        let url = fields::first_str(item, fields::URL).and_then(canonicalize_url);
        let author = fields::first_str(item, fields::AUTHOR)
            .unwrap_or(EngagementRecord::UNKNOWN_AUTHOR)
            .to_string();

        let id = match fields::first_id(item, fields::ID) {
            Some(vendor_id) => format!("{}:{}", source.as_str(), vendor_id),
            None => {
                let key = format!(
                    "{}|{}|{}|{}|{}",
                    source.as_str(),
                    term,
                    url.as_deref().unwrap_or_default(),
                    content,
                    position
                );
                Uuid::new_v5(&RECORD_ID_NAMESPACE, key.as_bytes()).to_string()
            }
        };

        let parsed_ts = fields::first_parsed(item, fields::TIMESTAMP, parse_timestamp);
        let timestamp_approximate = parsed_ts.is_none();
        let timestamp = parsed_ts.unwrap_or(self.observed_at);

        let counts = Counts {
            likes: fields::first_count(item, fields::LIKES),
            comments: fields::first_count(item, fields::COMMENTS),
            shares: fields::first_count(item, fields::SHARES),
            views: fields::first_count(item, fields::VIEWS),
        };

        EngagementRecord {
            id,
            source,
            search_term: term.to_string(),
            author,
            derived: Derived {
                // Labelled per batch once filtering is done.
                sentiment: Sentiment::Neutral,
                severity: classify_severity(&content),
            },
            content,
            url,
            timestamp,
            timestamp_approximate,
            counts,
            provenance: Provenance::Real,
        }
    }
}
