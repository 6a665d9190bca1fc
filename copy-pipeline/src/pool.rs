//! Candidate pool built from one breadth call.

use std::collections::HashSet;

use crate::{config::PipelineConfig, validate::char_len};

/// Ordered, distinct (by trimmed text) candidates, capped in size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePool(Vec<String>);

impl CandidatePool {
    /// Pool taken as-is from the one-shot fallback: only blanks and exact
    /// duplicates are dropped, length and banned words are left to the
    /// rewrite loop.
    pub fn from_unfiltered(list: Vec<String>, cap: usize) -> Self {
        let mut seen = HashSet::new();
        let items = list
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(t.clone()))
            .take(cap)
            .collect();
        Self(items)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Flattens parsed lists and keeps trimmed, distinct, in-bounds, non-banned
/// entries in first-seen order, capped at `cfg.pool_cap`.
///
/// Idempotent: cleaning a cleaned pool yields the same pool.
pub fn clean<I, L>(raw_lists: I, cfg: &PipelineConfig) -> CandidatePool
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let items = raw_lists
        .into_iter()
        .flatten()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .filter(|t| char_len(t) <= cfg.max_chars)
        .filter(|t| !cfg.contains_banned(t))
        .take(cfg.pool_cap)
        .collect();
    CandidatePool(items)
}
