//! Bounded repair of a selected triple.
//!
//! Each round rewrites only the violating indices against a snapshot taken at
//! the start of the round. After the last round a deterministic repair pass
//! runs; its survivors must satisfy the set rule or the invocation fails.

use std::collections::BTreeSet;

use ai_llm_service::CompletionClient;
use tracing::{debug, info, warn};

use crate::{
    config::{PipelineConfig, RESULT_SIZE},
    error::PipelineError,
    parse::{Parsed, parse_single},
    prompt::build_rewrite_prompt,
    request::AdBrief,
    schema::ad_text_format,
    validate::{SetValidation, ValidationResult, validate_one, validate_set},
};

const GENERIC_REASON: &str = "규칙 위반";
const DUPLICATE_REASON: &str = "다른 문구와 중복";
const SIMILAR_REASON: &str = "다른 문구와 너무 유사";

/// Runs the rewrite rounds, then the final repair and its set check.
///
/// # Errors
/// - [`PipelineError::FinalizeFailure`] when fewer than three valid,
///   mutually dissimilar texts remain
/// - [`PipelineError::Timeout`] / [`PipelineError::Internal`] on transport failure
pub async fn repair_candidates(
    client: &dyn CompletionClient,
    brief: &AdBrief,
    mut current: Vec<String>,
    cfg: &PipelineConfig,
) -> Result<Vec<String>, PipelineError> {
    let format = ad_text_format(cfg.max_chars);

    for round in 1..=cfg.rewrite_rounds {
        let singles: Vec<ValidationResult> =
            current.iter().map(|t| validate_one(t, cfg)).collect();
        let set = validate_set(&current, cfg);
        let bad = bad_indices(&singles, &set);

        if bad.is_empty() {
            info!(round, "selected ad texts are valid");
            return Ok(current);
        }
        info!(round, bad = ?bad, "rewriting violating ad texts");

        let snapshot = current.clone();
        for idx in bad {
            let Some(original) = snapshot.get(idx) else {
                continue;
            };
            let others: Vec<&str> = snapshot
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, t)| t.as_str())
                .collect();
            let reasons = reason_phrase(singles.get(idx), &set, idx, cfg);
            let prompt = build_rewrite_prompt(brief, original, &reasons, &others, cfg);

            let reply = client.request_one(&prompt, &format).await?;
            if let Some(msg) = &reply.error_message {
                warn!(round, idx, error = %msg, "rewrite rejected by provider; keeping text");
                continue;
            }
            let rewritten = reply
                .usable_content()
                .map(parse_single)
                .and_then(Parsed::into_option)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());

            match rewritten {
                Some(text) => {
                    debug!(round, idx, from = %original, to = %text, "ad text rewritten");
                    if let Some(slot) = current.get_mut(idx) {
                        *slot = text;
                    }
                }
                None => warn!(round, idx, status = reply.status, "unusable rewrite; keeping text"),
            }
        }
    }

    let repaired = final_repair(&current, cfg);
    if repaired.len() < RESULT_SIZE {
        warn!(survivors = repaired.len(), "final repair left too few ad texts");
        return Err(PipelineError::FinalizeFailure {
            survivors: repaired.len(),
        });
    }
    if !validate_set(&repaired, cfg).is_clean() {
        warn!(texts = ?repaired, "final ad texts still too similar");
        return Err(PipelineError::FinalizeFailure {
            survivors: repaired.len(),
        });
    }
    Ok(repaired)
}

/// Trim, drop blanks, truncate overlength, drop banned, dedup, keep three.
pub fn final_repair(texts: &[String], cfg: &PipelineConfig) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(RESULT_SIZE);
    for t in texts {
        let t = t.trim();
        if t.is_empty() {
            continue;
        }
        let t: String = t.chars().take(cfg.max_chars).collect();
        if cfg.contains_banned(&t) || out.contains(&t) {
            continue;
        }
        out.push(t);
        if out.len() == RESULT_SIZE {
            break;
        }
    }
    out
}

fn bad_indices(singles: &[ValidationResult], set: &SetValidation) -> BTreeSet<usize> {
    let mut bad = set.bad_indices();
    bad.extend(
        singles
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.ok())
            .map(|(i, _)| i),
    );
    bad
}

/// Human-readable reasons for one index, individual rules first.
fn reason_phrase(
    single: Option<&ValidationResult>,
    set: &SetValidation,
    idx: usize,
    cfg: &PipelineConfig,
) -> String {
    let mut parts: Vec<String> = single
        .map(|v| v.reasons.iter().map(|r| r.describe(cfg)).collect())
        .unwrap_or_default();
    if set.duplicates.contains(&idx) {
        parts.push(DUPLICATE_REASON.to_string());
    }
    if set.similar.contains(&idx) {
        parts.push(SIMILAR_REASON.to_string());
    }
    if parts.is_empty() {
        GENERIC_REASON.to_string()
    } else {
        parts.join(", ")
    }
}
