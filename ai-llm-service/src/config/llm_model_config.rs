use crate::config::llm_provider::LlmProvider;

/// Configuration for a completion-model invocation.
///
/// # Fields
///
/// - `provider`: Which backend to use.
/// - `model`: The model identifier (e.g., `"gpt-5-nano"`).
/// - `endpoint`: API base URL without the `/v1/...` suffix.
/// - `api_key`: Bearer token for the provider.
/// - `max_tokens`: Optional completion token cap.
/// - `temperature`: Optional sampling temperature. Left unset by default,
///   several small reasoning models reject any non-default value.
/// - `connect_timeout_secs` / `read_timeout_secs` / `timeout_secs`: bounded
///   connect, per-read and whole-call deadlines.
///
/// # Examples
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::OpenAI,
///     model: "gpt-5-nano".to_string(),
///     endpoint: "https://api.openai.com".to_string(),
///     api_key: Some("sk-...".to_string()),
///     max_tokens: None,
///     temperature: None,
///     connect_timeout_secs: Some(10),
///     read_timeout_secs: Some(180),
///     timeout_secs: Some(180),
/// };
/// assert_eq!(cfg.model, "gpt-5-nano");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The completion provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// API base URL (e.g. `https://api.openai.com`).
    pub endpoint: String,

    /// API key for authentication.
    pub api_key: Option<String>,

    /// Maximum number of completion tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// TCP connect deadline (seconds).
    pub connect_timeout_secs: Option<u64>,

    /// Per-read deadline while waiting on the response body (seconds).
    pub read_timeout_secs: Option<u64>,

    /// Whole-call deadline, connect through last body byte (seconds).
    pub timeout_secs: Option<u64>,
}
