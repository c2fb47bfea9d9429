//! Local, deterministic brief entries used when no model output is available.

use crate::models::{Candidate, DigestItem, DigestPayload, ImpactLevel, ScoreBreakdown};
use crate::utils::truncate_chars;
use chrono::{DateTime, Utc};

use super::{FALLBACK_VERSION, sorted_sources};

const TITLE_CHARS: usize = 30;
const ONE_SENTENCE_CHARS: usize = 60;
const FACT_CHARS: usize = 50;

const NO_SUMMARY: &str = "要約なし";
const NO_FACTS: &str = "情報なし";
const SEE_SOURCE: &str = "一次情報はリンク参照";
const IMPLICATIONS: [&str; 2] = ["影響評価は後続改善で強化可能", "日本市場観点の追加余地あり"];
const OUTLOOK: [&str; 2] = ["次回更新で追記", "追加ソースで補強予定"];

const FALLBACK_SCORE: u32 = 60;
const FALLBACK_BREAKDOWN: ScoreBreakdown = ScoreBreakdown {
    market_impact: 20,
    business_impact: 20,
    japan_relevance: 15,
    confidence: 5,
};

fn or_placeholder(s: String, placeholder: &str) -> String {
    if s.is_empty() { placeholder.to_string() } else { s }
}

/// Placeholder entry for one selected candidate.
pub fn fallback_item(c: &Candidate) -> DigestItem {
    DigestItem {
        impact_level: ImpactLevel::Medium,
        importance_score: FALLBACK_SCORE,
        score_breakdown: FALLBACK_BREAKDOWN,
        title_ja: truncate_chars(&c.title, TITLE_CHARS),
        one_sentence: or_placeholder(truncate_chars(&c.summary, ONE_SENTENCE_CHARS), NO_SUMMARY),
        fact_summary: vec![
            or_placeholder(truncate_chars(&c.summary, FACT_CHARS), NO_FACTS),
            SEE_SOURCE.to_string(),
        ],
        implications: IMPLICATIONS.iter().map(|s| s.to_string()).collect(),
        outlook: OUTLOOK.iter().map(|s| s.to_string()).collect(),
        original_title: c.title.clone(),
        original_url: c.url.clone(),
        published_at: c.published_at.to_rfc3339(),
        source: c.source.clone(),
    }
}

/// Build the fallback payload for `selection` at time `now`.
pub fn fallback_payload(selection: &[Candidate], now: DateTime<Utc>) -> DigestPayload {
    let items: Vec<DigestItem> = selection.iter().map(fallback_item).collect();
    DigestPayload {
        date_iso: now.date_naive().to_string(),
        sources: sorted_sources(&items),
        items,
        generated_at: now.to_rfc3339(),
        version: FALLBACK_VERSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bucket;
    use chrono::TimeZone;

    fn cand(source: &str, title: &str, summary: &str) -> Candidate {
        Candidate {
            source: source.to_string(),
            title: title.to_string(),
            url: format!("https://example.com/{}", source.to_lowercase()),
            published_at: Utc.with_ymd_and_hms(2025, 5, 6, 3, 4, 5).unwrap(),
            summary: summary.to_string(),
            bucket: Bucket::Tech,
            priority: 3,
        }
    }

    #[test]
    fn test_scenario_title_is_first_30_chars() {
        let title = "OpenAI raises prices amid GPU shortage";
        let item = fallback_item(&cand("OpenAI", title, "pricing change for enterprise"));
        assert_eq!(item.title_ja, "OpenAI raises prices amid GPU ");
        assert_eq!(item.title_ja.chars().count(), 30);
        assert_eq!(item.one_sentence, "pricing change for enterprise");
        assert_eq!(item.impact_level, ImpactLevel::Medium);
        assert_eq!(item.importance_score, 60);
        assert_eq!(item.score_breakdown, FALLBACK_BREAKDOWN);
        assert_eq!(item.published_at, "2025-05-06T03:04:05+00:00");
    }

    #[test]
    fn test_empty_summary_uses_placeholders() {
        let item = fallback_item(&cand("AINOW", "生成AIの新機能", ""));
        assert_eq!(item.one_sentence, NO_SUMMARY);
        assert_eq!(item.fact_summary, vec![NO_FACTS.to_string(), SEE_SOURCE.to_string()]);
        assert_eq!(item.implications.len(), 2);
        assert_eq!(item.outlook.len(), 2);
    }

    #[test]
    fn test_long_summary_truncation() {
        let summary = "x".repeat(100);
        let item = fallback_item(&cand("A", "t", &summary));
        assert_eq!(item.one_sentence.len(), 60);
        assert_eq!(item.fact_summary[0].len(), 50);
    }

    #[test]
    fn test_payload_is_deterministic_apart_from_generated_at() {
        let selection = vec![cand("OpenAI", "a", "s1"), cand("AINOW", "b", "s2"), cand("AINOW", "c", "s3")];
        let t1 = Utc.with_ymd_and_hms(2025, 5, 6, 0, 0, 1).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 5, 6, 23, 0, 0).unwrap();

        let p1 = fallback_payload(&selection, t1);
        let p2 = fallback_payload(&selection, t2);
        assert_eq!(
            serde_json::to_string(&p1.items).unwrap(),
            serde_json::to_string(&p2.items).unwrap()
        );
        assert_ne!(p1.generated_at, p2.generated_at);
        assert_eq!(p1.date_iso, "2025-05-06");
        assert_eq!(p1.version, FALLBACK_VERSION);
        assert_eq!(p1.sources, vec!["AINOW".to_string(), "OpenAI".to_string()]);
    }

    #[test]
    fn test_empty_selection_is_valid() {
        let p = fallback_payload(&[], Utc::now());
        assert!(p.items.is_empty());
        assert!(p.sources.is_empty());
    }
}
