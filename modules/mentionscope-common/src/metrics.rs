use serde::{Deserialize, Serialize};

use crate::types::{EngagementRecord, Provenance, Sentiment};

/// Aggregate statistics over a full record set.
///
/// Always rebuilt from the records with [`RollupMetrics::from_records`];
/// never patched incrementally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollupMetrics {
    pub total_mentions: u64,
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub neutral_pct: f64,
    /// Sum of view counts.
    pub total_reach: u64,
    /// Sum of likes + comments + shares.
    pub total_engagement: u64,
    /// How many of `total_mentions` are synthetic.
    pub fallback_mentions: u64,
}

impl RollupMetrics {
    pub fn from_records(records: &[EngagementRecord]) -> Self {
        let mut positive = 0u64;
        let mut negative = 0u64;
        let mut neutral = 0u64;
        let mut reach = 0u64;
        let mut engagement = 0u64;
        let mut fallback = 0u64;

        for record in records {
            match record.derived.sentiment {
                Sentiment::Positive => positive += 1,
                Sentiment::Negative => negative += 1,
                Sentiment::Neutral => neutral += 1,
            }
            reach = reach.saturating_add(record.counts.views);
            engagement = engagement.saturating_add(record.counts.engagement());
            if record.provenance == Provenance::Fallback {
                fallback += 1;
            }
        }

        let total = records.len() as u64;
        let pct = |n: u64| {
            if total == 0 {
                0.0
            } else {
                n as f64 * 100.0 / total as f64
            }
        };

        Self {
            total_mentions: total,
            positive_pct: pct(positive),
            negative_pct: pct(negative),
            neutral_pct: pct(neutral),
            total_reach: reach,
            total_engagement: engagement,
            fallback_mentions: fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::{Counts, Derived, Severity, SourceName};

    fn record(sentiment: Sentiment, counts: Counts, provenance: Provenance) -> EngagementRecord {
        EngagementRecord {
            id: "x".into(),
            source: SourceName::TikTok,
            search_term: "covid".into(),
            author: "a".into(),
            content: String::new(),
            url: None,
            timestamp: Utc::now(),
            timestamp_approximate: false,
            counts,
            derived: Derived {
                sentiment,
                severity: Severity::Low,
            },
            provenance,
        }
    }

    #[test]
    fn empty_records_give_all_zero_metrics() {
        assert_eq!(RollupMetrics::from_records(&[]), RollupMetrics::default());
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let records = vec![
            record(Sentiment::Positive, Counts::default(), Provenance::Real),
            record(Sentiment::Negative, Counts::default(), Provenance::Real),
            record(Sentiment::Neutral, Counts::default(), Provenance::Real),
        ];
        let m = RollupMetrics::from_records(&records);
        assert_eq!(m.total_mentions, 3);
        let sum = m.positive_pct + m.negative_pct + m.neutral_pct;
        assert!((sum - 100.0).abs() < 1e-9, "sum was {sum}");
    }

    #[test]
    fn reach_and_engagement_are_summed_separately() {
        let a = Counts {
            likes: 10,
            comments: 2,
            shares: 1,
            views: 500,
        };
        let b = Counts {
            likes: 5,
            comments: 0,
            shares: 0,
            views: 0,
        };
        let records = vec![
            record(Sentiment::Positive, a, Provenance::Real),
            record(Sentiment::Neutral, b, Provenance::Fallback),
        ];
        let m = RollupMetrics::from_records(&records);
        assert_eq!(m.total_reach, 500);
        assert_eq!(m.total_engagement, 18);
        assert_eq!(m.fallback_mentions, 1);
    }
}
