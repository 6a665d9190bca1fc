//! Default completion-model config loaded from environment variables.
//!
//! # Environment variables
//!
//! - `OPENAI_API_KEY`           = bearer token (mandatory)
//! - `OPENAI_URL`               = API base (default `https://api.openai.com`)
//! - `OPENAI_MODEL`             = model id (default `gpt-5-nano`)
//! - `LLM_MAX_TOKENS`           = optional completion token cap (u32)
//! - `LLM_CONNECT_TIMEOUT_SECS` = connect deadline (default 10)
//! - `LLM_READ_TIMEOUT_SECS`    = per-read deadline (default 180)
//! - `LLM_TIMEOUT_SECS`         = whole-call deadline (default 180)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_u32, env_opt_u64, env_or, must_env,
        validate_http_endpoint,
    },
};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-5-nano";

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 180;

/// Constructs the OpenAI config used for ad-copy generation.
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if `OPENAI_API_KEY` is missing
/// - [`ConfigError::InvalidFormat`] if `OPENAI_URL` has no http/https scheme
/// - [`ConfigError::InvalidNumber`] for malformed numeric knobs
/// - [`ConfigError::EmptyModel`] if `OPENAI_MODEL` is set to whitespace only
pub fn config_openai() -> Result<LlmModelConfig, AiLlmError> {
    let api_key = must_env("OPENAI_API_KEY")?;
    let endpoint = env_or("OPENAI_URL", DEFAULT_OPENAI_URL);
    validate_http_endpoint("OPENAI_URL", endpoint.trim())?;

    let model = env_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL).trim().to_string();
    if model.is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model,
        endpoint: endpoint.trim().to_string(),
        api_key: Some(api_key),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: None,
        connect_timeout_secs: Some(
            env_opt_u64("LLM_CONNECT_TIMEOUT_SECS")?.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        ),
        read_timeout_secs: Some(
            env_opt_u64("LLM_READ_TIMEOUT_SECS")?.unwrap_or(DEFAULT_READ_TIMEOUT_SECS),
        ),
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_CALL_TIMEOUT_SECS)),
    })
}
