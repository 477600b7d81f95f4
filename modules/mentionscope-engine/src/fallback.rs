// Fallback data: synthetic mentions for sources that failed or came back
// empty. Every record is tagged `Provenance::Fallback` and flagged with an
// approximate timestamp.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mentionscope_common::{
    Counts, Derived, EngagementRecord, Provenance, Severity, SourceName, TimeWindow,
};
use rand::Rng;
use uuid::Uuid;

use crate::classify::{classify_severity, SentimentEstimator};

/// Words that put generated content into one severity bucket. Each contains a
/// keyword of its own bucket and none from a higher one.
fn topic_words(severity: Severity) -> &'static [&'static str] {
    match severity {
        Severity::Critical => &["emergency", "outbreak", "evacuation", "explosion", "fatal crash"],
        Severity::High => &["crisis", "urgent call", "shortage", "scam", "fraud"],
        Severity::Medium => &["warning", "concern", "complaint", "delay", "rumor"],
        Severity::Low => &["update", "announcement", "review", "event", "reminder"],
    }
}

const TEMPLATES: &[&str] = &[
    "{topic} about {term} in {region}",
    "Seeing a lot of {topic} talk around {term} near {region}",
    "{term}: {topic} shared by locals in {region}",
    "Anyone else following the {term} {topic} in {region}?",
    "Latest on {term} ({region}): {topic}",
];

const HANDLE_PREFIXES: &[&str] = &["local", "daily", "city", "newsdesk", "community", "voices"];

const DEFAULT_REGION: &str = "the area";

/// Inputs for one source's fallback batch.
#[derive(Debug, Clone, Copy)]
pub struct FallbackRequest<'a> {
    pub term: &'a str,
    pub source: SourceName,
    pub region: Option<&'a str>,
    pub count: usize,
    pub observed_at: DateTime<Utc>,
    pub window: TimeWindow,
    /// Only buckets at or above this level are drawn from.
    pub min_severity: Option<Severity>,
}

/// Produces plausible stand-in records. All randomness comes from the caller's
/// RNG, so a seeded RNG gives a reproducible batch.
#[derive(Clone)]
pub struct FallbackGenerator {
    estimator: Arc<dyn SentimentEstimator>,
}

impl FallbackGenerator {
    pub fn new(estimator: Arc<dyn SentimentEstimator>) -> Self {
        Self { estimator }
    }

    pub fn generate<R: Rng>(&self, rng: &mut R, req: FallbackRequest<'_>) -> Vec<EngagementRecord> {
        let buckets: Vec<Severity> = Severity::ALL
            .into_iter()
            .filter(|s| req.min_severity.map_or(true, |min| *s >= min))
            .collect();
        let region = req
            .region
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REGION);
        let term = req.term.trim();
        let window_secs = req.window.duration().num_seconds().max(1);

        let labels: Vec<_> = self.estimator.estimate(req.count).labels().collect();

        labels
            .into_iter()
            .map(|sentiment| {
                let bucket = buckets[rng.random_range(0..buckets.len())];
                let topics = topic_words(bucket);
                let topic = topics[rng.random_range(0..topics.len())];
                let template = TEMPLATES[rng.random_range(0..TEMPLATES.len())];
                let content = template
                    .replace("{topic}", topic)
                    .replace("{term}", term)
                    .replace("{region}", region);

                let prefix = HANDLE_PREFIXES[rng.random_range(0..HANDLE_PREFIXES.len())];
                let author = format!("{}_{}", prefix, rng.random_range(100..1000));

                let views = match req.source {
                    SourceName::Web => 0,
                    _ => rng.random_range(100..20_000),
                };
                let counts = Counts {
                    likes: rng.random_range(0..500),
                    comments: rng.random_range(0..80),
                    shares: rng.random_range(0..60),
                    views,
                };

                let age = Duration::seconds(rng.random_range(0..window_secs));
                let id = Uuid::from_bytes(rng.random::<[u8; 16]>());

                EngagementRecord {
                    id: format!("fallback-{id}"),
                    source: req.source,
                    search_term: term.to_string(),
                    author,
                    derived: Derived {
                        sentiment,
                        severity: classify_severity(&content),
                    },
                    content,
                    url: None,
                    timestamp: req.observed_at - age,
                    timestamp_approximate: true,
                    counts,
                    provenance: Provenance::Fallback,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::classify::FixedRatioEstimator;

    fn generator() -> FallbackGenerator {
        FallbackGenerator::new(Arc::new(FixedRatioEstimator::default()))
    }

    fn request(count: usize) -> FallbackRequest<'static> {
        FallbackRequest {
            term: "water main",
            source: SourceName::TikTok,
            region: Some("Minneapolis"),
            count,
            observed_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            window: TimeWindow::Week,
            min_severity: None,
        }
    }

    #[test]
    fn rows_are_marked_synthetic() {
        let records = generator().generate(&mut StdRng::seed_from_u64(1), request(5));
        assert_eq!(records.len(), 5);
        for r in &records {
            assert_eq!(r.provenance, Provenance::Fallback);
            assert!(r.id.starts_with("fallback-"));
            assert!(r.timestamp_approximate);
            assert_eq!(r.url, None);
            assert!(r.content.contains("water main"));
            assert!(r.content.contains("Minneapolis"));
        }
    }

    #[test]
    fn same_seed_same_batch() {
        let a = generator().generate(&mut StdRng::seed_from_u64(42), request(8));
        let b = generator().generate(&mut StdRng::seed_from_u64(42), request(8));
        assert_eq!(a, b);
    }

    #[test]
    fn severity_floor_is_respected() {
        let req = FallbackRequest {
            min_severity: Some(Severity::High),
            ..request(40)
        };
        let records = generator().generate(&mut StdRng::seed_from_u64(7), req);
        assert!(records.iter().all(|r| r.derived.severity >= Severity::High));
    }

    #[test]
    fn topic_words_classify_into_their_own_bucket() {
        for severity in Severity::ALL {
            for topic in topic_words(severity) {
                for template in TEMPLATES {
                    let content = template
                        .replace("{topic}", topic)
                        .replace("{term}", "parade")
                        .replace("{region}", DEFAULT_REGION);
                    assert_eq!(classify_severity(&content), severity, "{content}");
                }
            }
        }
    }

    #[test]
    fn timestamps_stay_inside_the_window() {
        let req = request(30);
        let earliest = req.observed_at - req.window.duration();
        let records = generator().generate(&mut StdRng::seed_from_u64(3), req);
        for r in &records {
            assert!(r.timestamp <= req.observed_at);
            assert!(r.timestamp >= earliest);
        }
    }

    #[test]
    fn web_rows_have_no_views_and_region_defaults() {
        let req = FallbackRequest {
            source: SourceName::Web,
            region: None,
            ..request(4)
        };
        let records = generator().generate(&mut StdRng::seed_from_u64(9), req);
        assert!(records.iter().all(|r| r.counts.views == 0));
        assert!(records.iter().all(|r| r.content.contains(DEFAULT_REGION)));
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(generator()
            .generate(&mut StdRng::seed_from_u64(0), request(0))
            .is_empty());
    }
}
