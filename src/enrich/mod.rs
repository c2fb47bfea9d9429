//! Turning the selection into brief entries.
//!
//! Two strategies produce a [`DigestPayload`]:
//!
//! | Variant | `version` | When |
//! |---------|-----------|------|
//! | [`Enrichment::Structured`] | `B1-RSS-OpenAI-1.0` | An analysis credential is configured and the model reply validates |
//! | [`Enrichment::Fallback`] | `B1-RSS-Fallback-1.0` | No credential, empty selection, or any analysis failure |
//!
//! A failed analysis is logged and never fails the run.

pub mod analyst;
pub mod fallback;

use crate::models::{Bucket, Candidate, DigestItem, DigestPayload};
use crate::utils::{looks_truncated, strip_code_fence, truncate_for_log};
use analyst::{AnalysisError, Analyst};
use chrono::{DateTime, NaiveDate, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

pub const STRUCTURED_VERSION: &str = "B1-RSS-OpenAI-1.0";
pub const FALLBACK_VERSION: &str = "B1-RSS-Fallback-1.0";

/// Outcome of enrichment. Both arms carry a complete payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    Structured(DigestPayload),
    Fallback(DigestPayload),
}

impl Enrichment {
    pub fn payload(&self) -> &DigestPayload {
        match self {
            Enrichment::Structured(p) | Enrichment::Fallback(p) => p,
        }
    }

    pub fn into_payload(self) -> DigestPayload {
        match self {
            Enrichment::Structured(p) | Enrichment::Fallback(p) => p,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Enrichment::Structured(_))
    }
}

/// Distinct, non-empty `source` values of `items`, sorted.
pub(crate) fn sorted_sources(items: &[DigestItem]) -> Vec<String> {
    items
        .iter()
        .map(|i| i.source.trim())
        .filter(|s| !s.is_empty())
        .unique()
        .sorted()
        .map(str::to_string)
        .collect()
}

const SYSTEM_PROMPT: &str = "You are a calm, analytical strategy analyst covering the AI industry for Japanese readers. \
No hype, no opinion, no overclaiming. \
Evaluate every story from a Japanese market perspective (business, investment, regulation, deployment) and publish your scores. \
Write all free-text fields in Japanese. \
Respond with valid JSON only: no prose, no Markdown.";

const OUTPUT_SCHEMA: &str = r#"{
  "date_iso": "YYYY-MM-DD",
  "items": [
    {
      "impact_level": "High|Medium|Low",
      "importance_score": 0-100,
      "score_breakdown": {
        "market_impact": 0-40,
        "business_impact": 0-30,
        "japan_relevance": 0-20,
        "confidence": 0-10
      },
      "title_ja": "concise title, about 30 characters",
      "one_sentence": "about 60 characters",
      "fact_summary": ["2-4 entries"],
      "implications": ["2-4 entries"],
      "outlook": ["2-4 entries"],
      "original_title": "string",
      "original_url": "string",
      "published_at": "ISO8601",
      "source": "string"
    }
  ]
}"#;

/// Selection member as shown to the model.
#[derive(Debug, Serialize)]
struct ArticleBrief<'a> {
    source: &'a str,
    original_title: &'a str,
    original_url: &'a str,
    published_at: String,
    summary_raw: &'a str,
    bucket: Bucket,
    priority: u8,
}

impl<'a> From<&'a Candidate> for ArticleBrief<'a> {
    fn from(c: &'a Candidate) -> Self {
        Self {
            source: &c.source,
            original_title: &c.title,
            original_url: &c.url,
            published_at: c.published_at.to_rfc3339(),
            summary_raw: &c.summary,
            bucket: c.bucket,
            priority: c.priority,
        }
    }
}

/// Build the user message: instructions, output schema, and the serialized selection.
pub fn build_user_prompt(selection: &[Candidate], date_iso: &str) -> Result<String, AnalysisError> {
    let articles: Vec<ArticleBrief<'_>> = selection.iter().map(ArticleBrief::from).collect();
    let input = json!({
        "date_iso": date_iso,
        "articles": articles,
        "score_rule": {
            "importance_score": "0-100",
            "breakdown": {
                "market_impact": "0-40",
                "business_impact": "0-30",
                "japan_relevance": "0-20",
                "confidence": "0-10"
            },
            "note": "Japan relevance is weighted; keep conservative confidence."
        }
    });

    Ok(format!(
        "Restructure the following {count} articles for structural reading, in Japanese, and publish a score for each.\n\
         Return exactly {count} items, one per article, in the same order.\n\
         Return JSON only (no explanation, no Markdown, no preamble).\n\n\
         Output schema (strict):\n{OUTPUT_SCHEMA}\n\n\
         Input:\n{input}",
        count = selection.len(),
        input = serde_json::to_string(&input)?,
    ))
}

#[derive(Debug, Deserialize)]
struct AnalysisReply {
    #[serde(default)]
    date_iso: Option<String>,
    items: Vec<DigestItem>,
}

/// Validate a raw model reply against the selection and build the structured payload.
///
/// The reply may be wrapped in a Markdown code fence. It must contain one
/// item per selected candidate, each with scores in range. A `date_iso`
/// that is not a valid `YYYY-MM-DD` date is replaced by today's date.
pub fn parse_analysis(raw: &str, expected: usize, now: DateTime<Utc>) -> Result<DigestPayload, AnalysisError> {
    let cleaned = strip_code_fence(raw);
    let reply: AnalysisReply = serde_json::from_str(&cleaned)?;

    if reply.items.len() != expected {
        return Err(AnalysisError::ItemCount {
            expected,
            got: reply.items.len(),
        });
    }
    for (i, item) in reply.items.iter().enumerate() {
        if item.importance_score > 100 {
            return Err(AnalysisError::InvalidField(format!(
                "items[{i}].importance_score = {}",
                item.importance_score
            )));
        }
        if let Some(field) = item.score_breakdown.out_of_range() {
            return Err(AnalysisError::InvalidField(format!("items[{i}].score_breakdown.{field}")));
        }
    }

    let today = now.date_naive().to_string();
    let date_iso = reply
        .date_iso
        .map(|d| d.trim().to_string())
        .filter(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok())
        .unwrap_or(today);

    Ok(DigestPayload {
        date_iso,
        sources: sorted_sources(&reply.items),
        items: reply.items,
        generated_at: now.to_rfc3339(),
        version: STRUCTURED_VERSION.to_string(),
    })
}

async fn structured_payload<A: Analyst>(
    analyst: &A,
    selection: &[Candidate],
    now: DateTime<Utc>,
) -> Result<DigestPayload, AnalysisError> {
    let user = build_user_prompt(selection, &now.date_naive().to_string())?;
    let raw = analyst.ask(SYSTEM_PROMPT, &user).await?;
    parse_analysis(&raw, selection.len(), now).inspect_err(|e| {
        if let AnalysisError::Json(je) = e {
            if looks_truncated(je) {
                warn!("Analysis reply looks truncated");
            }
        }
        warn!(reply_preview = %truncate_for_log(&raw, 300), "Rejected analysis reply");
    })
}

/// Enrich the selection, preferring the model when one is configured.
///
/// `analyst` is `None` when no credential is set. Every failure path ends in
/// [`Enrichment::Fallback`].
#[instrument(level = "info", skip_all, fields(selected = selection.len(), analyst = analyst.is_some()))]
pub async fn enrich<A: Analyst>(analyst: Option<&A>, selection: &[Candidate], now: DateTime<Utc>) -> Enrichment {
    let Some(analyst) = analyst else {
        info!("No analysis credential configured; using fallback template");
        return Enrichment::Fallback(fallback::fallback_payload(selection, now));
    };
    if selection.is_empty() {
        info!("Nothing selected; skipping analysis");
        return Enrichment::Fallback(fallback::fallback_payload(selection, now));
    }

    match structured_payload(analyst, selection, now).await {
        Ok(payload) => {
            info!(items = payload.items.len(), "Structured analysis accepted");
            Enrichment::Structured(payload)
        }
        Err(e) => {
            warn!(error = %e, "Analysis failed; falling back to template");
            Enrichment::Fallback(fallback::fallback_payload(selection, now))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImpactLevel;
    use chrono::TimeZone;
    use std::cell::Cell;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 6, 7, 0, 0).unwrap()
    }

    fn cand(source: &str, title: &str) -> Candidate {
        Candidate {
            source: source.to_string(),
            title: title.to_string(),
            url: format!("https://example.com/{}", source.to_lowercase().replace(' ', "-")),
            published_at: Utc.with_ymd_and_hms(2025, 5, 5, 0, 0, 0).unwrap(),
            summary: "pricing change for enterprise".to_string(),
            bucket: Bucket::Market,
            priority: 1,
        }
    }

    fn selection() -> Vec<Candidate> {
        vec![
            cand("OpenAI", "OpenAI raises prices amid GPU shortage"),
            cand("AINOW", "生成AIの規制動向"),
            cand("The Verge AI", "New open source model"),
        ]
    }

    fn reply_item(source: &str, score: u32) -> serde_json::Value {
        json!({
            "impact_level": "High",
            "importance_score": score,
            "score_breakdown": {"market_impact": 30, "business_impact": 20, "japan_relevance": 15, "confidence": 7},
            "title_ja": "価格改定",
            "one_sentence": "企業向け価格が変わる。",
            "fact_summary": ["a", "b"],
            "implications": ["c", "d"],
            "outlook": ["e", "f"],
            "original_title": "t",
            "original_url": "https://example.com/x",
            "published_at": "2025-05-05T00:00:00+00:00",
            "source": source
        })
    }

    fn reply(items: Vec<serde_json::Value>) -> String {
        json!({"date_iso": "2025-05-06", "items": items}).to_string()
    }

    /// Returns a canned reply and counts calls.
    struct StubAnalyst {
        reply: Result<String, ()>,
        calls: Cell<usize>,
    }

    impl StubAnalyst {
        fn ok(reply: String) -> Self {
            Self {
                reply: Ok(reply),
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                calls: Cell::new(0),
            }
        }
    }

    impl Analyst for StubAnalyst {
        async fn ask(&self, _system: &str, _user: &str) -> Result<String, AnalysisError> {
            self.calls.set(self.calls.get() + 1);
            self.reply.clone().map_err(|_| AnalysisError::Status {
                status: 500,
                body: "boom".to_string(),
            })
        }
    }

    #[test]
    fn test_parse_accepts_fenced_reply() {
        let raw = format!(
            "```json\n{}\n```",
            reply(vec![reply_item("OpenAI", 82), reply_item("AINOW", 70), reply_item("OpenAI", 65)])
        );
        let payload = parse_analysis(&raw, 3, now()).unwrap();
        assert_eq!(payload.version, STRUCTURED_VERSION);
        assert_eq!(payload.date_iso, "2025-05-06");
        assert_eq!(payload.items.len(), 3);
        assert_eq!(payload.items[0].impact_level, ImpactLevel::High);
        assert_eq!(payload.sources, vec!["AINOW".to_string(), "OpenAI".to_string()]);
        assert_eq!(payload.generated_at, now().to_rfc3339());
    }

    #[test]
    fn test_parse_rejects_wrong_count() {
        let raw = reply(vec![reply_item("OpenAI", 80), reply_item("AINOW", 70)]);
        assert!(matches!(
            parse_analysis(&raw, 3, now()),
            Err(AnalysisError::ItemCount { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn test_parse_rejects_out_of_range_scores() {
        let raw = reply(vec![reply_item("A", 101), reply_item("B", 50), reply_item("C", 50)]);
        assert!(matches!(parse_analysis(&raw, 3, now()), Err(AnalysisError::InvalidField(_))));

        let mut bad = reply_item("A", 50);
        bad["score_breakdown"]["market_impact"] = json!(41);
        let raw = reply(vec![bad, reply_item("B", 50), reply_item("C", 50)]);
        assert!(matches!(parse_analysis(&raw, 3, now()), Err(AnalysisError::InvalidField(_))));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(matches!(parse_analysis("not json", 3, now()), Err(AnalysisError::Json(_))));
        assert!(matches!(parse_analysis("{\"items\": {}}", 3, now()), Err(AnalysisError::Json(_))));

        let mut bad = reply_item("A", 50);
        bad["impact_level"] = json!("Critical");
        let raw = reply(vec![bad, reply_item("B", 50), reply_item("C", 50)]);
        assert!(matches!(parse_analysis(&raw, 3, now()), Err(AnalysisError::Json(_))));
    }

    #[test]
    fn test_parse_replaces_invalid_date() {
        let raw = json!({
            "date_iso": "../../etc",
            "items": [reply_item("A", 50), reply_item("B", 50), reply_item("C", 50)]
        })
        .to_string();
        assert_eq!(parse_analysis(&raw, 3, now()).unwrap().date_iso, "2025-05-06");

        let raw = json!({"items": [reply_item("A", 50)]}).to_string();
        assert_eq!(parse_analysis(&raw, 1, now()).unwrap().date_iso, "2025-05-06");
    }

    #[test]
    fn test_user_prompt_carries_selection() {
        let prompt = build_user_prompt(&selection(), "2025-05-06").unwrap();
        assert!(prompt.contains("Return exactly 3 items"));
        assert!(prompt.contains("\"original_url\":\"https://example.com/openai\""));
        assert!(prompt.contains("生成AIの規制動向"));
        assert!(prompt.contains("\"bucket\":\"market\""));
        assert!(prompt.contains("japan_relevance"));
    }

    #[tokio::test]
    async fn test_no_credential_uses_fallback() {
        let result = enrich(None::<&StubAnalyst>, &selection(), now()).await;
        assert!(!result.is_structured());
        let payload = result.into_payload();
        assert_eq!(payload.version, FALLBACK_VERSION);
        assert_eq!(payload.items[0].title_ja, "OpenAI raises prices amid GPU ");
    }

    #[tokio::test]
    async fn test_structured_reply_accepted() {
        let analyst = StubAnalyst::ok(reply(vec![
            reply_item("OpenAI", 82),
            reply_item("AINOW", 70),
            reply_item("The Verge AI", 65),
        ]));
        let result = enrich(Some(&analyst), &selection(), now()).await;
        assert!(result.is_structured());
        assert_eq!(result.payload().version, STRUCTURED_VERSION);
        assert_eq!(result.payload().sources.len(), 3);
        assert_eq!(analyst.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_two_item_reply_falls_back_for_all_three() {
        let analyst = StubAnalyst::ok(reply(vec![reply_item("OpenAI", 82), reply_item("AINOW", 70)]));
        let result = enrich(Some(&analyst), &selection(), now()).await;
        assert!(!result.is_structured());

        let payload = result.into_payload();
        assert_eq!(payload.version, FALLBACK_VERSION);
        assert_eq!(payload.items.len(), 3);
        assert!(payload.items.iter().all(|i| i.importance_score == 60));
    }

    #[tokio::test]
    async fn test_service_error_falls_back() {
        let analyst = StubAnalyst::failing();
        let result = enrich(Some(&analyst), &selection(), now()).await;
        assert_eq!(result.payload().version, FALLBACK_VERSION);
    }

    #[tokio::test]
    async fn test_empty_selection_skips_analysis() {
        let analyst = StubAnalyst::ok(reply(vec![]));
        let result = enrich(Some(&analyst), &[], now()).await;
        assert!(!result.is_structured());
        assert!(result.payload().items.is_empty());
        assert_eq!(analyst.calls.get(), 0);
    }
}
