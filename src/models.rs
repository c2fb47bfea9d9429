//! Data models for feed candidates and the published brief.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FeedConfig`]: One configured RSS/Atom feed
//! - [`Candidate`]: A deduplicated, relevance-filtered news item
//! - [`Bucket`]: The three coverage categories a candidate can fall into
//! - [`DigestPayload`]: The JSON document written to `today.json` and the archive
//! - [`DigestItem`]: One enriched entry of the brief, with its score breakdown
//!
//! Field names of the output types match the published JSON schema exactly,
//! which is also the schema the analysis model is asked to return.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named feed endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Display name; doubles as the candidate's `source`.
    pub name: String,
    /// RSS or Atom document URL.
    pub url: String,
}

impl FeedConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Coverage category of a candidate.
///
/// Declaration order is the order the selector fills slots in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Market,
    Policy,
    Tech,
}

impl Bucket {
    /// Slot order used by the diverse selector.
    pub const SLOT_ORDER: [Bucket; 3] = [Bucket::Market, Bucket::Policy, Bucket::Tech];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Market => "market",
            Bucket::Policy => "policy",
            Bucket::Tech => "tech",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A news item that survived normalization, deduplication and the relevance filter.
///
/// Candidates are built once by the collector and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Name of the feed the item came from. Not unique across candidates.
    pub source: String,
    /// Plain-text title.
    pub title: String,
    /// Normalized URL; unique within one collection run.
    pub url: String,
    /// Publication time in UTC, or collection time when the feed had none.
    pub published_at: DateTime<Utc>,
    /// Plain-text excerpt, at most 1500 characters.
    pub summary: String,
    pub bucket: Bucket,
    /// 1 (first-party lab) to 3 (everything else).
    pub priority: u8,
}

/// Impact level assigned to a brief entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

/// Four-part decomposition of `importance_score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 0-40
    pub market_impact: u32,
    /// 0-30
    pub business_impact: u32,
    /// 0-20
    pub japan_relevance: u32,
    /// 0-10
    pub confidence: u32,
}

impl ScoreBreakdown {
    pub const MAX_MARKET_IMPACT: u32 = 40;
    pub const MAX_BUSINESS_IMPACT: u32 = 30;
    pub const MAX_JAPAN_RELEVANCE: u32 = 20;
    pub const MAX_CONFIDENCE: u32 = 10;

    /// Returns the name of the first sub-score outside its range, if any.
    pub fn out_of_range(&self) -> Option<&'static str> {
        if self.market_impact > Self::MAX_MARKET_IMPACT {
            Some("market_impact")
        } else if self.business_impact > Self::MAX_BUSINESS_IMPACT {
            Some("business_impact")
        } else if self.japan_relevance > Self::MAX_JAPAN_RELEVANCE {
            Some("japan_relevance")
        } else if self.confidence > Self::MAX_CONFIDENCE {
            Some("confidence")
        } else {
            None
        }
    }
}

/// One enriched entry of the brief.
///
/// Produced either by the analysis model or by the local fallback template;
/// both paths serialize to the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestItem {
    pub impact_level: ImpactLevel,
    /// 0-100
    pub importance_score: u32,
    pub score_breakdown: ScoreBreakdown,
    /// Localized short title.
    pub title_ja: String,
    /// Localized one-sentence summary.
    pub one_sentence: String,
    pub fact_summary: Vec<String>,
    pub implications: Vec<String>,
    pub outlook: Vec<String>,
    pub original_title: String,
    pub original_url: String,
    pub published_at: String,
    pub source: String,
}

/// The document persisted once per run.
///
/// Field order here is the key order in the written JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestPayload {
    /// `YYYY-MM-DD`; also the archive file name.
    pub date_iso: String,
    pub items: Vec<DigestItem>,
    /// RFC 3339 UTC timestamp of payload construction.
    pub generated_at: String,
    /// Tag of the enrichment variant that produced the payload.
    pub version: String,
    /// Distinct `source` values among `items`, sorted.
    pub sources: Vec<String>,
}
