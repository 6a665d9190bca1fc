use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Startup/serve errors of the HTTP layer.
///
/// Request-level failures never surface here: generation outcomes are always
/// rendered as the soft-failure envelope.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    // --- IO / network / server ---
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),
}

impl AppError {
    /// Stable code for startup logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Llm(_) => "CONFIG_ERROR",
            AppError::Bind { .. } => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
        }
    }
}
