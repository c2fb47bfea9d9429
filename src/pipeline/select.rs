//! Diversity-constrained pick of the brief's three stories.

use crate::models::{Bucket, Candidate};
use std::collections::HashSet;

/// Stories per brief.
pub const SELECTION_SIZE: usize = 3;

/// Pick up to three candidates, one per source, covering the buckets when possible.
///
/// Expects `candidates` in collector order. First, each of `market`,
/// `policy`, `tech` takes the earliest candidate of that bucket whose source
/// is still unused. Then, while fewer than three are picked, the earliest
/// remaining candidates with unused sources fill the gaps. Deterministic:
/// the same input always yields the same selection.
pub fn pick_diverse(candidates: &[Candidate]) -> Vec<Candidate> {
    let mut picked: Vec<Candidate> = Vec::with_capacity(SELECTION_SIZE);
    let mut used_sources: HashSet<&str> = HashSet::new();

    for bucket in Bucket::SLOT_ORDER {
        if let Some(c) = candidates
            .iter()
            .find(|c| c.bucket == bucket && !used_sources.contains(c.source.as_str()))
        {
            used_sources.insert(&c.source);
            picked.push(c.clone());
        }
    }

    for c in candidates {
        if picked.len() >= SELECTION_SIZE {
            break;
        }
        if used_sources.insert(&c.source) {
            picked.push(c.clone());
        }
    }

    picked.truncate(SELECTION_SIZE);
    picked
}
