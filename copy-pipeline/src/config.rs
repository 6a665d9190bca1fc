//! Immutable pipeline knobs.
//!
//! `PipelineConfig::default()` carries the production values;
//! [`PipelineConfig::from_env`] overrides them from `AD_COPY_*` variables.
//! Unparsable values fall back to the default silently.

use std::time::Duration;

/// Maximum characters (Unicode scalar values) per ad text.
pub const DEFAULT_MAX_CHARS: usize = 30;
/// Candidate pool cap.
pub const DEFAULT_POOL_CAP: usize = 40;
/// Pairwise 2-gram Jaccard similarity at or above which a candidate is penalized.
pub const DEFAULT_SIM_THRESHOLD: f64 = 0.40;
/// Rewrite rounds before the deterministic final repair.
pub const DEFAULT_REWRITE_ROUNDS: usize = 2;
/// Completions requested by the breadth call.
pub const DEFAULT_BREADTH: u32 = 5;
/// Whole-invocation deadline.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
/// Default banned substrings.
pub const DEFAULT_BANNED_WORDS: [&str; 5] = ["최고의", "완벽한", "프리미엄", "지금 바로", "놓치지 마세요"];

/// Final result size.
pub const RESULT_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub max_chars: usize,
    pub banned_words: Vec<String>,
    pub pool_cap: usize,
    pub similarity_threshold: f64,
    pub rewrite_rounds: usize,
    pub breadth: u32,
    pub request_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            banned_words: DEFAULT_BANNED_WORDS.iter().map(|w| w.to_string()).collect(),
            pool_cap: DEFAULT_POOL_CAP,
            similarity_threshold: DEFAULT_SIM_THRESHOLD,
            rewrite_rounds: DEFAULT_REWRITE_ROUNDS,
            breadth: DEFAULT_BREADTH,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl PipelineConfig {
    /// Reads overrides from the environment.
    ///
    /// Recognized variables: `AD_COPY_MAX_CHARS`, `AD_COPY_BANNED_WORDS`
    /// (comma-separated), `AD_COPY_POOL_CAP`, `AD_COPY_SIM_THRESHOLD`,
    /// `AD_COPY_REWRITE_ROUNDS`, `AD_COPY_BREADTH`,
    /// `AD_COPY_REQUEST_TIMEOUT_SECS`.
    ///
    /// # Example
    /// ```
    /// # use copy_pipeline::config::PipelineConfig;
    /// let cfg = PipelineConfig::from_env();
    /// assert!(cfg.max_chars >= 1);
    /// ```
    pub fn from_env() -> Self {
        let dflt = Self::default();

        let banned_words = std::env::var("AD_COPY_BANNED_WORDS")
            .ok()
            .map(|raw| split_words(&raw))
            .filter(|w| !w.is_empty())
            .unwrap_or(dflt.banned_words);

        Self {
            max_chars: parse("AD_COPY_MAX_CHARS", dflt.max_chars).max(1),
            banned_words,
            pool_cap: parse("AD_COPY_POOL_CAP", dflt.pool_cap).max(RESULT_SIZE),
            similarity_threshold: parse("AD_COPY_SIM_THRESHOLD", dflt.similarity_threshold)
                .clamp(0.0, 1.0),
            rewrite_rounds: parse("AD_COPY_REWRITE_ROUNDS", dflt.rewrite_rounds),
            breadth: parse("AD_COPY_BREADTH", dflt.breadth).max(1),
            request_timeout: Duration::from_secs(
                parse("AD_COPY_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS).max(1),
            ),
        }
    }

    /// Plain substring containment against the banned list.
    pub fn contains_banned(&self, text: &str) -> bool {
        self.banned_words.iter().any(|w| text.contains(w.as_str()))
    }
}

fn split_words(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}
