//! Completion-service client shared by the ad-copy backend.
//!
//! - [`services::open_ai_service::OpenAiService`] issues schema-constrained
//!   chat completions and can ask for `n` independent choices per call.
//!   Its `probe_models` backs `/health` on the same pooled client.
//! - [`completion::CompletionClient`] is the seam the pipeline depends on.
//! - [`telemetry`] holds the service-scoped tracing layer.

pub mod completion;
pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;

pub use completion::{
    CompletionClient, CompletionFuture, CompletionResult, ResponseFormat, SingleCompletion,
};
pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::AiLlmError;
