//! Pipeline failure taxonomy and its user-facing warnings.
//!
//! Every variant is recovered at the pipeline boundary and rendered as the
//! `ok:false` envelope; nothing here is fatal to the process.

use std::{fmt, time::Duration};

use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Stage that produced an empty completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pool,
    Selection,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Pool => write!(f, "pool"),
            Stage::Selection => write!(f, "selection"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("required fields are blank: {}", .missing.join(", "))]
    RequestInvalid { missing: Vec<&'static str> },

    #[error("completion service error: {0}")]
    Upstream(String),

    #[error("empty {stage} response (status {status})")]
    EmptyResponse { stage: Stage, status: u16 },

    #[error("selection output could not be parsed")]
    ParseFailure,

    #[error("candidate pool is empty after the one-shot fallback")]
    PoolExhausted,

    #[error("selection returned {got} candidates")]
    SelectionFailure { got: usize },

    #[error("final repair left {survivors} valid candidates")]
    FinalizeFailure { survivors: usize },

    #[error("deadline of {0:?} exceeded")]
    Timeout(Duration),

    #[error("internal failure: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Message shown to the caller in `warning`.
    pub fn warning(&self) -> String {
        match self {
            PipelineError::RequestInvalid { missing } => {
                format!("필수 입력값이 누락됐어요: {}", missing.join(", "))
            }
            PipelineError::Upstream(msg) => msg.clone(),
            PipelineError::EmptyResponse {
                stage: Stage::Pool, ..
            } => "후보 생성 응답이 비어 있어 생성에 실패했어요. 다시 시도해 주세요.".into(),
            PipelineError::EmptyResponse {
                stage: Stage::Selection,
                ..
            } => "선별 응답이 비어 있어 생성에 실패했어요. 다시 시도해 주세요.".into(),
            PipelineError::ParseFailure | PipelineError::SelectionFailure { .. } => {
                "선별은 됐지만 형식 파싱에 실패했어요. 다시 시도해 주세요.".into()
            }
            PipelineError::PoolExhausted => {
                "후보 풀 생성에 실패했어요. 다시 시도해 주세요.".into()
            }
            PipelineError::FinalizeFailure { .. } => {
                "최종 문구 생성에 실패했어요. 다시 시도해 주세요.".into()
            }
            PipelineError::Timeout(_) => {
                "요청이 시간 초과됐어요. 잠시 후 다시 시도해 주세요.".into()
            }
            PipelineError::Internal(_) => {
                "서버 오류로 생성에 실패했어요. 잠시 후 다시 시도해 주세요.".into()
            }
        }
    }

    /// Diagnostic text, only for unexpected failures.
    pub fn detail(&self) -> Option<&str> {
        match self {
            PipelineError::Internal(d) => Some(d.as_str()),
            _ => None,
        }
    }

    /// HTTP status of an empty breadth response, surfaced as `meta.openai_status`.
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            PipelineError::EmptyResponse {
                stage: Stage::Pool,
                status,
            } => Some(*status),
            _ => None,
        }
    }

    /// Stable short code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::RequestInvalid { .. } => "request_invalid",
            PipelineError::Upstream(_) => "upstream_error",
            PipelineError::EmptyResponse { .. } => "empty_response",
            PipelineError::ParseFailure => "parse_failure",
            PipelineError::PoolExhausted => "pool_exhausted",
            PipelineError::SelectionFailure { .. } => "selection_failure",
            PipelineError::FinalizeFailure { .. } => "finalize_failure",
            PipelineError::Timeout(_) => "timeout",
            PipelineError::Internal(_) => "internal",
        }
    }
}

impl From<AiLlmError> for PipelineError {
    fn from(err: AiLlmError) -> Self {
        match err {
            AiLlmError::Timeout(d) => PipelineError::Timeout(d),
            other => PipelineError::Internal(other.to_string()),
        }
    }
}
