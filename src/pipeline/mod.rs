//! The candidate pipeline: from raw feed entries to the brief's selection.
//!
//! # Stages
//!
//! 1. [`normalize`]: canonical URL keys used for deduplication
//! 2. [`dates`]: best-effort publication timestamps
//! 3. [`classify`]: relevance filter, coverage bucket, and source tier
//! 4. [`collect`]: per-feed ingestion, global dedup, ranking
//! 5. [`select`]: three stories, distinct sources, bucket coverage first

pub mod classify;
pub mod collect;
pub mod dates;
pub mod normalize;
pub mod select;
