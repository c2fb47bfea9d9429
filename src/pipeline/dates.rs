//! Best-effort publication timestamps from heterogeneous feed metadata.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Raw date strings exposed by a feed entry, one per slot.
///
/// The feed parser maps RSS `pubDate`/`dc:date` into `published`, Atom
/// `updated`/`modified` into `updated` and `dcterms:created` into `created`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDates {
    pub published: Option<String>,
    pub updated: Option<String>,
    pub created: Option<String>,
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%a, %d %b %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
];

/// `%#z` also takes hour-only offsets such as `+09`.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Resolve the entry's timestamp, trying `published`, `updated`, then `created`.
///
/// The first slot that is present and parses wins. Returns `None` when no
/// slot parses; the collector substitutes the collection time.
pub fn resolve_published(dates: &EntryDates) -> Option<DateTime<Utc>> {
    [&dates.published, &dates.updated, &dates.created]
        .into_iter()
        .flatten()
        .find_map(|raw| parse_date(raw))
}

/// Parse one date string into UTC. Timestamps without an offset are taken as UTC.
///
/// Returns `None` for anything unrecognized; never panics on malformed input.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    // RFC 2822 knows `UT` and `GMT` but not `UTC`
    let rfc2822 = s.strip_suffix(" UTC").map(|head| format!("{head} +0000"));
    if let Ok(dt) = DateTime::parse_from_rfc2822(rfc2822.as_deref().unwrap_or(s)) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
