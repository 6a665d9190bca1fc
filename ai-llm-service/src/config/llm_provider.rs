/// Represents the provider (backend) used for text completions.
///
/// Only the OpenAI chat-completions API is wired today: it is the one backend
/// that accepts both a JSON-schema `response_format` and an `n` choice count
/// in a single call.
///
/// # Examples
///
/// ```
/// use ai_llm_service::LlmProvider;
///
/// fn describe(provider: LlmProvider) -> &'static str {
///     match provider {
///         LlmProvider::OpenAI => "OpenAI chat completions",
///     }
/// }
/// assert_eq!(describe(LlmProvider::OpenAI), "OpenAI chat completions");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// OpenAI's chat-completions API (or a compatible gateway).
    OpenAI,
}
