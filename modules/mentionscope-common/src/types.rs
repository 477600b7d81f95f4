use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PermissionDenied, ValidationError};
use crate::metrics::RollupMetrics;

// --- Sources ---

/// One external scraping/search API. Declaration order is the canonical
/// ordering used for status maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceName {
    #[serde(rename = "tiktok")]
    TikTok,
    #[serde(rename = "instagram")]
    Instagram,
    #[serde(rename = "twitter")]
    Twitter,
    #[serde(rename = "facebook")]
    Facebook,
    #[serde(rename = "youtube")]
    YouTube,
    #[serde(rename = "web")]
    Web,
}

impl SourceName {
    pub const ALL: [SourceName; 6] = [
        SourceName::TikTok,
        SourceName::Instagram,
        SourceName::Twitter,
        SourceName::Facebook,
        SourceName::YouTube,
        SourceName::Web,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::TikTok => "tiktok",
            SourceName::Instagram => "instagram",
            SourceName::Twitter => "twitter",
            SourceName::Facebook => "facebook",
            SourceName::YouTube => "youtube",
            SourceName::Web => "web",
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SourceName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiktok" => Ok(SourceName::TikTok),
            "instagram" | "ig" => Ok(SourceName::Instagram),
            "twitter" | "x" => Ok(SourceName::Twitter),
            "facebook" | "fb" => Ok(SourceName::Facebook),
            "youtube" | "yt" => Ok(SourceName::YouTube),
            "web" | "search" => Ok(SourceName::Web),
            other => Err(format!("unknown source: {other}")),
        }
    }
}

// --- Derived signals ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// Ordered lowest to highest, so `>=` means "at least as severe".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// Whether a record came from a live vendor response or was synthesized.
/// Consumers that need ground truth must check this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Real,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derived {
    pub sentiment: Sentiment,
    pub severity: Severity,
}

/// Engagement counters. Absent vendor fields are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub views: u64,
}

impl Counts {
    /// Likes + comments + shares. Views count toward reach, not engagement.
    pub fn engagement(&self) -> u64 {
        self.likes
            .saturating_add(self.comments)
            .saturating_add(self.shares)
    }
}

// --- Canonical record ---

/// A single mention, normalized from any source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub id: String,
    pub source: SourceName,
    pub search_term: String,
    pub author: String,
    pub content: String,
    pub url: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// True when the source gave no usable timestamp and `timestamp` is the
    /// observation time (or a synthesized time for fallback rows).
    pub timestamp_approximate: bool,
    pub counts: Counts,
    pub derived: Derived,
    pub provenance: Provenance,
}

impl EngagementRecord {
    pub const UNKNOWN_AUTHOR: &'static str = "unknown";

    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

// --- Requests ---

/// The lookback window a search covers. Drives the per-source result budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
    Month,
    Quarter,
}

impl TimeWindow {
    /// How many items to ask each vendor for. A pagination hint only.
    pub fn result_limit(&self) -> u32 {
        match self {
            TimeWindow::Day => 10,
            TimeWindow::Week => 25,
            TimeWindow::Month => 50,
            TimeWindow::Quarter => 100,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            TimeWindow::Day => Duration::days(1),
            TimeWindow::Week => Duration::days(7),
            TimeWindow::Month => Duration::days(30),
            TimeWindow::Quarter => Duration::days(90),
        }
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "24h" => Ok(TimeWindow::Day),
            "week" | "7d" => Ok(TimeWindow::Week),
            "month" | "30d" => Ok(TimeWindow::Month),
            "quarter" | "90d" => Ok(TimeWindow::Quarter),
            other => Err(format!("unknown time window: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Newest,
    MostEngagement,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "recent" => Ok(SortOrder::Newest),
            "most_engagement" | "engagement" => Ok(SortOrder::MostEngagement),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// One user-initiated search across a set of sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub term: String,
    pub region: Option<String>,
    pub language: Option<String>,
    pub severity_filter: Option<Severity>,
    pub sources: Vec<SourceName>,
    #[serde(default)]
    pub window: TimeWindow,
    pub sort: Option<SortOrder>,
}

impl SearchRequest {
    pub fn new(term: impl Into<String>, sources: impl IntoIterator<Item = SourceName>) -> Self {
        Self {
            term: term.into(),
            region: None,
            language: None,
            severity_filter: None,
            sources: sources.into_iter().collect(),
            window: TimeWindow::default(),
            sort: None,
        }
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn severity_filter(mut self, severity: Severity) -> Self {
        self.severity_filter = Some(severity);
        self
    }

    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Check the request invariants: a non-blank term and at least one source.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.term.trim().is_empty() {
            return Err(ValidationError::EmptyTerm);
        }
        if self.sources.is_empty() {
            return Err(ValidationError::NoSources);
        }
        Ok(())
    }

    /// Requested sources in declaration order, first occurrence wins.
    pub fn distinct_sources(&self) -> Vec<SourceName> {
        let mut seen = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            if !seen.contains(source) {
                seen.push(*source);
            }
        }
        seen
    }
}

// --- Results ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Ok,
    Empty,
    Error,
}

/// The outcome of one aggregation. Always renderable: degraded sources show up
/// in `per_source_status` and their rows carry `Provenance::Fallback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub term: String,
    pub observed_at: DateTime<Utc>,
    pub records: Vec<EngagementRecord>,
    pub metrics: RollupMetrics,
    pub per_source_status: BTreeMap<SourceName, SourceStatus>,
    /// Failure reason for every source whose status is `Error`.
    pub source_errors: BTreeMap<SourceName, String>,
}

impl AggregationResult {
    pub fn fallback_records(&self) -> impl Iterator<Item = &EngagementRecord> {
        self.records.iter().filter(|r| r.is_fallback())
    }

    pub fn sources_with(&self, status: SourceStatus) -> Vec<SourceName> {
        self.per_source_status
            .iter()
            .filter(|(_, s)| **s == status)
            .map(|(name, _)| *name)
            .collect()
    }

    /// True if any row is synthetic or any source did not answer cleanly.
    pub fn is_degraded(&self) -> bool {
        self.metrics.fallback_mentions > 0
            || self
                .per_source_status
                .values()
                .any(|s| *s != SourceStatus::Ok)
    }

    /// Copy with export-sensitive fields (author, url) removed when the
    /// viewer lacks `can_export_data`. Metrics and provenance are untouched.
    pub fn redacted(&self, permissions: &Permissions) -> AggregationResult {
        let mut out = self.clone();
        if !permissions.can_export_data {
            for record in &mut out.records {
                record.author = EngagementRecord::UNKNOWN_AUTHOR.to_string();
                record.url = None;
            }
        }
        out
    }
}

// --- Collaborator boundaries ---

/// Opaque capability set supplied by the auth layer.
///
/// The aggregator itself never consults `can_search`; callers gate on it
/// (see `require_search`) before invoking a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub can_search: bool,
    pub can_export_data: bool,
}

impl Permissions {
    pub fn require_search(&self) -> Result<(), PermissionDenied> {
        if self.can_search {
            Ok(())
        } else {
            Err(PermissionDenied("search capability required"))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Uuid);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A merged aggregation handed to storage.
#[derive(Debug, Clone, Copy)]
pub struct NewBatch<'a> {
    pub term: &'a str,
    pub sources: &'a [SourceName],
    pub records: &'a [EngagementRecord],
    pub metrics: &'a RollupMetrics,
}

/// A batch as read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedBatch {
    pub id: BatchId,
    pub term: String,
    pub sources: Vec<SourceName>,
    pub records: Vec<EngagementRecord>,
    pub metrics: RollupMetrics,
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_term_is_rejected() {
        let req = SearchRequest::new("   ", [SourceName::TikTok]);
        assert_eq!(req.validate(), Err(ValidationError::EmptyTerm));
    }

    #[test]
    fn missing_sources_are_rejected() {
        let req = SearchRequest::new("covid", []);
        assert_eq!(req.validate(), Err(ValidationError::NoSources));
    }

    #[test]
    fn distinct_sources_keeps_first_occurrence() {
        let req = SearchRequest::new(
            "covid",
            [
                SourceName::Facebook,
                SourceName::TikTok,
                SourceName::Facebook,
            ],
        );
        assert_eq!(
            req.distinct_sources(),
            vec![SourceName::Facebook, SourceName::TikTok]
        );
    }

    #[test]
    fn severity_orders_low_to_critical() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn source_names_round_trip_through_serde() {
        let json = serde_json::to_string(&SourceName::TikTok).unwrap();
        assert_eq!(json, "\"tiktok\"");
        let back: SourceName = serde_json::from_str("\"youtube\"").unwrap();
        assert_eq!(back, SourceName::YouTube);
        assert_eq!("X".parse::<SourceName>(), Ok(SourceName::Twitter));
    }

    #[test]
    fn shorter_windows_request_fewer_items() {
        assert!(TimeWindow::Day.result_limit() < TimeWindow::Week.result_limit());
        assert!(TimeWindow::Month.result_limit() < TimeWindow::Quarter.result_limit());
    }

    #[test]
    fn require_search_gates_on_capability() {
        assert!(Permissions::default().require_search().is_err());
        let allowed = Permissions {
            can_search: true,
            can_export_data: false,
        };
        assert!(allowed.require_search().is_ok());
    }
}
