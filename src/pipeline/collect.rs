//! Candidate collection across all configured feeds.
//!
//! Feeds are processed one after another. A feed that fails to download or
//! parse is logged and skipped; it never aborts the run.

use crate::feeds::fetch::FeedSource;
use crate::feeds::parse::{FeedEntry, parse_feed};
use crate::feeds::FeedError;
use crate::models::{Candidate, FeedConfig};
use crate::pipeline::classify::{infer_bucket, is_ai_related, source_priority};
use crate::pipeline::dates::resolve_published;
use crate::pipeline::normalize::normalize_url;
use crate::utils::{strip_html, truncate_chars};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Entries taken from the top of each feed.
pub const PER_FEED_LIMIT: usize = 12;
/// Upper bound on the sorted candidate list.
pub const MAX_CANDIDATES: usize = 80;
/// Summary length cap, in characters.
pub const SUMMARY_MAX_CHARS: usize = 1500;
/// Pause after each feed.
pub const FEED_PACING: Duration = Duration::from_millis(600);

/// Accumulator for one collection run.
///
/// Owns the set of normalized URLs seen so far; the first feed to yield a
/// URL keeps it.
#[derive(Debug, Default)]
pub struct CandidateSet {
    seen: HashSet<String>,
    items: Vec<Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn up to [`PER_FEED_LIMIT`] entries of one feed into candidates.
    ///
    /// `now` stands in for entries without a parseable date.
    /// Returns the number of candidates added.
    pub fn ingest(&mut self, source: &str, entries: Vec<FeedEntry>, now: DateTime<Utc>) -> usize {
        let priority = source_priority(source);
        let before = self.items.len();

        for entry in entries.into_iter().take(PER_FEED_LIMIT) {
            let (Some(link), Some(raw_title)) = (
                entry.link.as_deref().filter(|s| !s.trim().is_empty()),
                entry.title.as_deref().filter(|s| !s.trim().is_empty()),
            ) else {
                continue;
            };

            let url = normalize_url(link);
            if self.seen.contains(&url) {
                debug!(%url, "Duplicate URL; keeping first seen");
                continue;
            }

            let title = strip_html(raw_title);
            let summary = strip_html(entry.summary.as_deref().unwrap_or_default());
            if !is_ai_related(&title, &summary) {
                continue;
            }

            let bucket = infer_bucket(&title, &summary);
            let published_at = resolve_published(&entry.dates).unwrap_or(now);

            self.seen.insert(url.clone());
            self.items.push(Candidate {
                source: source.to_string(),
                title,
                url,
                published_at,
                summary: truncate_chars(&summary, SUMMARY_MAX_CHARS),
                bucket,
                priority,
            });
        }

        self.items.len() - before
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Order by priority (ascending), then recency (newest first), and cap at
    /// [`MAX_CANDIDATES`]. Priority always dominates recency.
    pub fn into_sorted(self) -> Vec<Candidate> {
        let mut items = self.items;
        items.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| b.published_at.cmp(&a.published_at))
        });
        items.truncate(MAX_CANDIDATES);
        items
    }
}

async fn fetch_entries<S: FeedSource>(source: &S, feed: &FeedConfig) -> Result<Vec<FeedEntry>, FeedError> {
    let body = source.fetch(feed).await?;
    parse_feed(&body)
}

/// Collect, deduplicate, filter and rank candidates from every feed.
///
/// `pacing` is slept after each feed that was processed.
#[instrument(level = "info", skip_all, fields(feeds = feeds.len()))]
pub async fn collect_candidates<S: FeedSource>(
    source: &S,
    feeds: &[FeedConfig],
    pacing: Duration,
) -> Vec<Candidate> {
    let mut set = CandidateSet::new();

    for feed in feeds {
        match fetch_entries(source, feed).await {
            Ok(entries) => {
                let found = entries.len();
                let added = set.ingest(&feed.name, entries, Utc::now());
                info!(feed = %feed.name, found, added, "Collected feed");
                if !pacing.is_zero() {
                    tokio::time::sleep(pacing).await;
                }
            }
            Err(e) => {
                warn!(feed = %feed.name, url = %feed.url, error = %e, "Feed failed; skipping");
            }
        }
    }

    if set.is_empty() {
        warn!("No relevant candidates from any feed");
    }
    let total = set.len();
    let candidates = set.into_sorted();
    info!(total, kept = candidates.len(), "Candidate collection finished");
    candidates
}
