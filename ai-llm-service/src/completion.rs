//! Provider-agnostic completion types and the [`CompletionClient`] seam.
//!
//! The contract towards callers is "best effort schema-conformant text,
//! tolerate deficiency": an explicit provider error is reported in
//! [`CompletionResult::error_message`], a malformed envelope yields empty
//! `contents`, and fewer choices than requested is not an error.
//! Only transport failures (timeouts, connection errors) are `Err`.

use std::{future::Future, pin::Pin};

use serde::Serialize;
use serde_json::{Value, json};

use crate::error_handler::AiLlmError;

/// Outcome of one completion call that asked for `n` choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    /// HTTP status returned by the provider.
    pub status: u16,
    /// Raw `message.content` of every returned choice, in order.
    pub contents: Vec<String>,
    /// Provider-supplied error text when the body carried an error object.
    pub error_message: Option<String>,
}

impl CompletionResult {
    /// `true` for a 2xx status.
    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Collapses to the single-choice view used by `request_one`.
    pub fn into_single(self) -> SingleCompletion {
        SingleCompletion {
            status: self.status,
            content: self.contents.into_iter().next(),
            error_message: self.error_message,
        }
    }
}

/// Outcome of a call that asked for exactly one choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleCompletion {
    pub status: u16,
    pub content: Option<String>,
    pub error_message: Option<String>,
}

impl SingleCompletion {
    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Content when present and not blank.
    pub fn usable_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// `response_format` descriptor sent with a chat completion.
///
/// Serializes to `{"type":"json_schema","json_schema":{"name":..,"strict":true,"schema":..}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResponseFormat(Value);

impl ResponseFormat {
    /// Strict JSON-schema output constraint under the given schema name.
    pub fn json_schema(name: &str, schema: Value) -> Self {
        Self(json!({
            "type": "json_schema",
            "json_schema": {
                "name": name,
                "strict": true,
                "schema": schema,
            }
        }))
    }

    /// Schema name, if present.
    pub fn name(&self) -> Option<&str> {
        self.0.pointer("/json_schema/name").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Boxed future returned by [`CompletionClient`] methods.
pub type CompletionFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, AiLlmError>> + Send + 'a>>;

/// Asynchronous completion backend.
///
/// Implementations must be safe to share across concurrent invocations
/// (connection pooling lives inside the implementation).
pub trait CompletionClient: Send + Sync {
    /// One call asking for `n` independent completions constrained by `format`.
    fn request_many<'a>(
        &'a self,
        prompt: &'a str,
        format: &'a ResponseFormat,
        n: u32,
    ) -> CompletionFuture<'a, CompletionResult>;

    /// `request_many(prompt, format, 1)` keeping only the first content.
    fn request_one<'a>(
        &'a self,
        prompt: &'a str,
        format: &'a ResponseFormat,
    ) -> CompletionFuture<'a, SingleCompletion> {
        Box::pin(async move {
            self.request_many(prompt, format, 1)
                .await
                .map(CompletionResult::into_single)
        })
    }
}
