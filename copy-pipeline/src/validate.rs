//! Per-candidate rules and set-level duplicate/similarity checks.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{PipelineConfig, RESULT_SIZE};

/// Unicode whitespace, Unicode punctuation (`P`) and ASCII punctuation/symbols.
static STRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\p{P}[:punct:]]+").expect("static normalization pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    Empty,
    TooLong,
    BannedWord,
}

impl Violation {
    /// Reason phrase used in rewrite prompts.
    pub fn describe(&self, cfg: &PipelineConfig) -> String {
        match self {
            Violation::Empty => "빈 문구".to_string(),
            Violation::TooLong => format!("{}자 초과", cfg.max_chars),
            Violation::BannedWord => "금칙어 포함".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub reasons: Vec<Violation>,
}

impl ValidationResult {
    pub fn ok(&self) -> bool {
        self.reasons.is_empty()
    }
}

/// Bad indices of a candidate triple, split by the rule that flagged them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetValidation {
    /// Fewer than three entries were supplied; all indices are bad.
    pub degenerate: bool,
    pub duplicates: BTreeSet<usize>,
    pub similar: BTreeSet<usize>,
}

impl SetValidation {
    pub fn bad_indices(&self) -> BTreeSet<usize> {
        if self.degenerate {
            return (0..RESULT_SIZE).collect();
        }
        self.duplicates.union(&self.similar).copied().collect()
    }

    pub fn is_clean(&self) -> bool {
        !self.degenerate && self.duplicates.is_empty() && self.similar.is_empty()
    }
}

/// Length in Unicode scalar values.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Judges `text` by its trimmed form only.
pub fn validate_one(text: &str, cfg: &PipelineConfig) -> ValidationResult {
    let mut reasons = Vec::new();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        reasons.push(Violation::Empty);
    }
    if char_len(trimmed) > cfg.max_chars {
        reasons.push(Violation::TooLong);
    }
    if cfg.contains_banned(trimmed) {
        reasons.push(Violation::BannedWord);
    }
    ValidationResult { reasons }
}

/// Checks the first three entries for exact duplicates and near-duplicates.
///
/// Every member of a duplicate group is bad. For a similar pair `(i, j)`
/// with `i < j` only `j` is marked.
pub fn validate_set(texts: &[String], cfg: &PipelineConfig) -> SetValidation {
    if texts.len() < RESULT_SIZE {
        return SetValidation {
            degenerate: true,
            ..Default::default()
        };
    }
    let triple = &texts[..RESULT_SIZE];

    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, t) in triple.iter().enumerate() {
        groups.entry(t.as_str()).or_default().push(i);
    }
    let duplicates = groups
        .into_values()
        .filter(|idx| idx.len() > 1)
        .flatten()
        .collect();

    let mut similar = BTreeSet::new();
    for i in 0..RESULT_SIZE {
        for j in (i + 1)..RESULT_SIZE {
            if jaccard_2gram(&triple[i], &triple[j]) >= cfg.similarity_threshold {
                similar.insert(j);
            }
        }
    }

    SetValidation {
        degenerate: false,
        duplicates,
        similar,
    }
}

/// Strips whitespace and punctuation.
pub fn normalize(s: &str) -> String {
    STRIP.replace_all(s, "").into_owned()
}

fn bigrams(s: &str) -> HashSet<(char, char)> {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// 2-gram Jaccard similarity of the normalized texts, in `[0, 1]`.
pub fn jaccard_2gram(a: &str, b: &str) -> f64 {
    let na = normalize(a);
    let nb = normalize(b);
    if na.is_empty() && nb.is_empty() {
        return 1.0;
    }

    let ga = bigrams(&na);
    let gb = bigrams(&nb);
    let union = ga.union(&gb).count();
    if union == 0 {
        return 0.0;
    }
    ga.intersection(&gb).count() as f64 / union as f64
}
