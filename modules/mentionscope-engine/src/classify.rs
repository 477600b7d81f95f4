// Severity and sentiment signals derived from content and batch volume.

use mentionscope_common::{Sentiment, Severity};

const CRITICAL_KEYWORDS: &[&str] = &[
    "emergency",
    "outbreak",
    "fatal",
    "death",
    "dead",
    "killed",
    "explosion",
    "attack",
    "evacuat",
    "pandemic",
    "shooting",
];

const HIGH_KEYWORDS: &[&str] = &[
    "crisis",
    "danger",
    "urgent",
    "violence",
    "riot",
    "hospitali",
    "scam",
    "fraud",
    "breach",
    "shortage",
    "lawsuit",
];

const MEDIUM_KEYWORDS: &[&str] = &[
    "warning",
    "concern",
    "complaint",
    "problem",
    "issue",
    "delay",
    "rumor",
    "misinformation",
    "risk",
    "protest",
];

const LOW_KEYWORDS: &[&str] = &[
    "update",
    "announce",
    "review",
    "tips",
    "event",
    "reminder",
];

/// Keyword buckets from highest to lowest priority.
const BUCKETS: [(Severity, &[&str]); 4] = [
    (Severity::Critical, CRITICAL_KEYWORDS),
    (Severity::High, HIGH_KEYWORDS),
    (Severity::Medium, MEDIUM_KEYWORDS),
    (Severity::Low, LOW_KEYWORDS),
];

/// Highest-priority bucket with a case-insensitive substring hit, else `Low`.
/// Pure: identical content always yields the identical level.
pub fn classify_severity(content: &str) -> Severity {
    let lower = content.to_lowercase();
    BUCKETS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(severity, _)| *severity)
        .unwrap_or(Severity::Low)
}

/// How many records of a batch fall into each sentiment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentSplit {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentSplit {
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// One label per record, in batch order: positives first, then
    /// negatives, then neutrals.
    pub fn labels(&self) -> impl Iterator<Item = Sentiment> {
        std::iter::repeat(Sentiment::Positive)
            .take(self.positive)
            .chain(std::iter::repeat(Sentiment::Negative).take(self.negative))
            .chain(std::iter::repeat(Sentiment::Neutral).take(self.neutral))
    }
}

/// Splits a batch of mentions by sentiment.
///
/// A real classifier can replace the shipped placeholder behind this trait
/// without any caller changing.
pub trait SentimentEstimator: Send + Sync {
    fn estimate(&self, batch_size: usize) -> SentimentSplit;
}

/// Placeholder estimator: a fixed-ratio split of volume, not an analysis of
/// content. The default 40% positive / 20% negative / 40% neutral has no
/// empirical basis and must not be read as a measurement.
#[derive(Debug, Clone, Copy)]
pub struct FixedRatioEstimator {
    positive_pct: usize,
    negative_pct: usize,
}

impl FixedRatioEstimator {
    /// Percentages are clamped so positive + negative never exceeds 100.
    pub fn new(positive_pct: usize, negative_pct: usize) -> Self {
        let positive_pct = positive_pct.min(100);
        let negative_pct = negative_pct.min(100 - positive_pct);
        Self {
            positive_pct,
            negative_pct,
        }
    }
}

impl Default for FixedRatioEstimator {
    fn default() -> Self {
        Self::new(40, 20)
    }
}

impl SentimentEstimator for FixedRatioEstimator {
    /// Positive and negative round down; neutral takes the remainder.
    fn estimate(&self, batch_size: usize) -> SentimentSplit {
        let positive = batch_size * self.positive_pct / 100;
        let negative = batch_size * self.negative_pct / 100;
        SentimentSplit {
            positive,
            negative,
            neutral: batch_size - positive - negative,
        }
    }
}
