//! OpenAI (chat completions) service for schema-constrained text generation.
//!
//! Minimal, non-streaming client around `POST {endpoint}/v1/chat/completions`.
//! One call may ask for `n` choices; every choice's `message.content` is kept.
//!
//! Constructor validation:
//! - `cfg.provider` must be `LlmProvider::OpenAI`
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://
//!
//! The body is decoded regardless of the HTTP status: OpenAI reports
//! quota/rate-limit problems as `{"error":{"message":..}}` and that text is
//! handed back to the caller in [`CompletionResult::error_message`].
//!
//! [`OpenAiService::probe_models`] backs `/health`: it lists `/v1/models` on
//! the same pooled client and reports whether the configured model is served.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    completion::{CompletionClient, CompletionFuture, CompletionResult, ResponseFormat},
    config::{
        default_config::{
            DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS,
        },
        llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::{
        AiLlmError, HealthError, HttpError, ProviderError, ProviderErrorKind, make_snippet,
    },
};

/// Fallback text when the provider sends an error object without a message.
const GENERIC_PROVIDER_ERROR: &str = "OpenAI error";

/// Thin client for the OpenAI chat-completions API.
///
/// Keeps one pooled `reqwest::Client` (timeouts + default headers); the
/// service is `Send + Sync` and meant to be shared behind an `Arc`.
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_models: String,
    call_timeout: Duration,
}

/// Provider snapshot served by `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderHealth {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `InvalidProvider` if `cfg.provider` is not OpenAI
    /// - [`AiLlmError::Provider`] with `MissingApiKey` if `cfg.api_key` is `None`
    /// - [`AiLlmError::Provider`] with `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::OpenAI {
            return Err(
                ProviderError::new(LlmProvider::OpenAI, ProviderErrorKind::InvalidProvider).into(),
            );
        }

        let api_key = cfg.api_key.clone().ok_or_else(|| {
            ProviderError::new(LlmProvider::OpenAI, ProviderErrorKind::MissingApiKey)
        })?;

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                LlmProvider::OpenAI,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let connect_timeout = Duration::from_secs(
            cfg.connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        );
        let read_timeout =
            Duration::from_secs(cfg.read_timeout_secs.unwrap_or(DEFAULT_READ_TIMEOUT_SECS));
        let call_timeout =
            Duration::from_secs(cfg.timeout_secs.unwrap_or(DEFAULT_CALL_TIMEOUT_SECS));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e| {
                ProviderError::new(
                    LlmProvider::OpenAI,
                    ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
                )
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .timeout(call_timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .tcp_keepalive(Some(Duration::from_secs(30)))
            .default_headers(headers)
            .build()?;

        let base = endpoint.trim_end_matches('/');
        let url_chat = format!("{base}/v1/chat/completions");
        let url_models = format!("{base}/v1/models");

        info!(
            provider = ?cfg.provider,
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            connect_timeout_secs = connect_timeout.as_secs(),
            timeout_secs = call_timeout.as_secs(),
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
            url_models,
            call_timeout,
        })
    }

    /// Model config this client was built from.
    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Performs one **non-streaming** chat completion asking for `n` choices.
    ///
    /// # Errors
    /// - [`AiLlmError::Timeout`] when the connect/read/call deadline is hit
    /// - [`AiLlmError::HttpTransport`] for other client/network failures
    pub async fn complete(
        &self,
        prompt: &str,
        format: &ResponseFormat,
        n: u32,
    ) -> Result<CompletionResult, AiLlmError> {
        let started = Instant::now();
        let body = ChatCompletionRequest::from_cfg(&self.cfg, prompt, format, n);

        debug!(
            model = %self.cfg.model,
            schema = format.name().unwrap_or("-"),
            prompt_len = prompt.chars().count(),
            n,
            "POST {}", self.url_chat
        );

        let resp = self
            .client
            .post(&self.url_chat)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiLlmError::from_transport(e, self.call_timeout))?;

        let status = resp.status().as_u16();
        let raw = resp
            .text()
            .await
            .map_err(|e| AiLlmError::from_transport(e, self.call_timeout))?;

        debug!(status, body = %raw, "OpenAI raw response");

        let result = parse_completion_body(status, &raw);

        if let Some(msg) = &result.error_message {
            warn!(
                status,
                model = %self.cfg.model,
                error = %msg,
                latency_ms = started.elapsed().as_millis(),
                "OpenAI returned an error object"
            );
        } else {
            info!(
                status,
                model = %self.cfg.model,
                requested = n,
                received = result.contents.len(),
                latency_ms = started.elapsed().as_millis(),
                "chat completion completed"
            );
        }

        Ok(result)
    }

    /// Checks that the provider answers and lists the configured model.
    ///
    /// Never fails; any error ends up in `message` with `ok = false`.
    pub async fn probe_models(&self) -> ProviderHealth {
        let started = Instant::now();
        let listed = self.list_models().await;
        let latency_ms = started.elapsed().as_millis();

        let (ok, message) = match listed {
            Ok(ids) if ids.iter().any(|id| *id == self.cfg.model) => {
                (true, "model is available".to_string())
            }
            Ok(ids) => (
                false,
                format!("model not listed ({} models served)", ids.len()),
            ),
            Err(e) => (false, e.to_string()),
        };

        if ok {
            info!(model = %self.cfg.model, latency_ms, "provider probe ok");
        } else {
            warn!(model = %self.cfg.model, latency_ms, %message, "provider probe failed");
        }

        ProviderHealth {
            provider: format!("{:?}", self.cfg.provider),
            endpoint: self.cfg.endpoint.trim().to_string(),
            model: self.cfg.model.clone(),
            ok,
            latency_ms,
            message,
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, AiLlmError> {
        debug!("GET {}", self.url_models);

        let resp = self
            .client
            .get(&self.url_models)
            .send()
            .await
            .map_err(|e| AiLlmError::from_transport(e, self.call_timeout))?;

        let status = resp.status();
        let raw = resp
            .text()
            .await
            .map_err(|e| AiLlmError::from_transport(e, self.call_timeout))?;

        if !status.is_success() {
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url: self.url_models.clone(),
                snippet: make_snippet(&raw),
            })
            .into());
        }

        let listing: ModelList =
            serde_json::from_str(&raw).map_err(|e| HealthError::Decode(e.to_string()))?;
        Ok(listing.data.into_iter().map(|m| m.id).collect())
    }
}

impl CompletionClient for OpenAiService {
    fn request_many<'a>(
        &'a self,
        prompt: &'a str,
        format: &'a ResponseFormat,
        n: u32,
    ) -> CompletionFuture<'a, CompletionResult> {
        Box::pin(self.complete(prompt, format, n))
    }
}

/// Decodes a chat-completions body into a [`CompletionResult`].
///
/// Never fails: an undecodable body yields empty `contents` and no error.
pub fn parse_completion_body(status: u16, raw: &str) -> CompletionResult {
    let mut result = CompletionResult {
        status,
        contents: Vec::new(),
        error_message: None,
    };

    let parsed: ChatCompletionResponse = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            debug!(
                status,
                error = %e,
                snippet = %make_snippet(raw),
                "completion body is not a decodable envelope"
            );
            return result;
        }
    };

    if let Some(err) = parsed.error {
        result.error_message = Some(
            err.message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_PROVIDER_ERROR.to_string()),
        );
        return result;
    }

    result.contents = parsed
        .choices
        .into_iter()
        .filter_map(|c| c.message.and_then(|m| m.content))
        .collect();
    result
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `/v1/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: &'a ResponseFormat,
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_cfg(
        cfg: &'a LlmModelConfig,
        prompt: &'a str,
        format: &'a ResponseFormat,
        n: u32,
    ) -> Self {
        Self {
            model: &cfg.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: format,
            n: n.max(1),
            max_completion_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Tolerant response shape: every field is optional.
#[derive(Debug, Default, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    error: Option<ApiErrorBody>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatMessageOut>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    #[serde(default)]
    content: Option<String>,
}

/// `GET /v1/models` body; only the ids matter.
#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}
