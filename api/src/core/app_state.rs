use std::sync::Arc;

use ai_llm_service::{
    config::default_config::config_openai, services::open_ai_service::OpenAiService,
};
use copy_pipeline::{AdCopyPipeline, PipelineConfig};

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// Ad-copy pipeline backed by the pooled completion client.
    pub pipeline: AdCopyPipeline,
    /// The same client, used directly by `/health`.
    pub provider: Arc<OpenAiService>,
}

impl AppState {
    pub fn new(pipeline: AdCopyPipeline, provider: Arc<OpenAiService>) -> Self {
        Self { pipeline, provider }
    }

    /// Load shared state from environment variables.
    ///
    /// # Errors
    /// [`AppError::Llm`] when the OpenAI config is incomplete or the HTTP
    /// client cannot be built.
    pub fn from_env() -> Result<Self, AppError> {
        let provider = Arc::new(OpenAiService::new(config_openai()?)?);
        let pipeline = AdCopyPipeline::new(provider.clone(), PipelineConfig::from_env());

        Ok(Self::new(pipeline, provider))
    }
}
