//! Keyword tables and the classifiers built on them.
//!
//! Every check is a plain substring test over lowercased text. A keyword found
//! inside a longer unrelated word still counts (`"ai"` matches `"said"`); this
//! keeps the filter loose and is accepted as is.

use crate::models::Bucket;

/// Terms that make an item AI-related (English and Japanese).
pub const AI_KEYWORDS: &[&str] = &[
    "ai",
    "artificial intelligence",
    "machine learning",
    "deep learning",
    "llm",
    "gpt",
    "chatgpt",
    "claude",
    "gemini",
    "foundation model",
    "agent",
    "inference",
    "training",
    "benchmark",
    "transformer",
    "gpu",
    "nvidia",
    "chip",
    "semiconductor",
    "ai act",
    "regulation",
    "governance",
    "copyright",
    "export controls",
    "生成ai",
    "人工知能",
    "大規模言語モデル",
    "推論",
    "学習",
    "規制",
    "半導体",
];

pub const POLICY_KEYWORDS: &[&str] = &[
    "regulation",
    "ai act",
    "law",
    "policy",
    "government",
    "ban",
    "copyright",
    "antitrust",
    "export",
    "controls",
    "sanction",
    "compliance",
];

pub const MARKET_KEYWORDS: &[&str] = &[
    "funding",
    "valuation",
    "investment",
    "ipo",
    "earnings",
    "revenue",
    "acquisition",
    "merger",
    "deal",
    "partnership",
    "pricing",
    "layoff",
];

pub const TECH_KEYWORDS: &[&str] = &[
    "model",
    "release",
    "benchmark",
    "training",
    "inference",
    "agent",
    "chip",
    "gpu",
    "architecture",
    "open source",
    "dataset",
    "token",
    "context",
];

/// Bucket keyword groups in the order they are tested. First match wins.
pub const BUCKET_RULES: &[(Bucket, &[&str])] = &[
    (Bucket::Policy, POLICY_KEYWORDS),
    (Bucket::Market, MARKET_KEYWORDS),
    (Bucket::Tech, TECH_KEYWORDS),
];

/// Source-name markers for tier 1 (first-party labs).
pub const TIER1_MARKERS: &[&str] = &["openai", "anthropic", "deepmind", "google", "hugging face"];

/// Source-name markers for tier 2.
pub const TIER2_MARKERS: &[&str] = &["itmedia", "ainow"];

fn blob(title: &str, summary: &str) -> String {
    format!("{title} {summary}").to_lowercase()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|k| haystack.contains(k))
}

/// True if the title or summary mentions any AI keyword.
pub fn is_ai_related(title: &str, summary: &str) -> bool {
    contains_any(&blob(title, summary), AI_KEYWORDS)
}

/// Assign the coverage bucket: policy, then market, then tech; `tech` if nothing matches.
pub fn infer_bucket(title: &str, summary: &str) -> Bucket {
    let text = blob(title, summary);
    BUCKET_RULES
        .iter()
        .find(|(_, keywords)| contains_any(&text, keywords))
        .map(|(bucket, _)| *bucket)
        .unwrap_or(Bucket::Tech)
}

/// Trust tier of a feed, derived only from its name. 1 is highest.
pub fn source_priority(source: &str) -> u8 {
    let name = source.to_lowercase();
    if contains_any(&name, TIER1_MARKERS) {
        1
    } else if contains_any(&name, TIER2_MARKERS) {
        2
    } else {
        3
    }
}
