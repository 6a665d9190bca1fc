//! End-to-end orchestration: validate → pool → select → repair → envelope.

use std::sync::Arc;

use ai_llm_service::CompletionClient;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

use crate::{
    config::{PipelineConfig, RESULT_SIZE},
    envelope::AdCopyResponse,
    error::{PipelineError, Stage},
    parse::{Parsed, parse_list},
    pool::{CandidatePool, clean},
    prompt::{build_base_prompt, build_selection_prompt},
    request::{AdBrief, GenerationRequest},
    rewrite::repair_candidates,
    schema::ad_texts_format,
};

/// Shared, cheaply clonable pipeline handle.
#[derive(Clone)]
pub struct AdCopyPipeline {
    client: Arc<dyn CompletionClient>,
    config: Arc<PipelineConfig>,
}

impl AdCopyPipeline {
    pub fn new(client: Arc<dyn CompletionClient>, config: PipelineConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one invocation on its own task under the request deadline.
    ///
    /// Never fails: every outcome is rendered as an [`AdCopyResponse`].
    /// Dropping the returned future aborts the task.
    pub async fn generate(&self, request: GenerationRequest) -> AdCopyResponse {
        let deadline = self.config.request_timeout;
        let this = self.clone();
        let mut task = AbortOnDrop(tokio::spawn(async move { this.run(&request).await }));

        let outcome = match tokio::time::timeout(deadline, &mut task.0).await {
            Ok(Ok(res)) => res,
            Ok(Err(join_err)) => Err(PipelineError::Internal(describe_join_error(join_err))),
            Err(_) => {
                task.0.abort();
                Err(PipelineError::Timeout(deadline))
            }
        };

        match &outcome {
            Ok(texts) => info!(count = texts.len(), "ad copy generated"),
            Err(e) if matches!(e, PipelineError::Internal(_)) => {
                error!(code = e.code(), error = %e, "ad copy generation failed")
            }
            Err(e) => warn!(code = e.code(), error = %e, "ad copy generation soft-failed"),
        }
        outcome.into()
    }

    /// The pipeline steps without the task/deadline wrapper.
    pub async fn run(&self, request: &GenerationRequest) -> Result<Vec<String>, PipelineError> {
        let cfg = self.config.as_ref();
        let brief = AdBrief::try_from(request)?;

        let base_prompt = build_base_prompt(&brief, cfg);
        let pool = self.build_pool(&base_prompt).await?;
        info!(pool = pool.len(), "candidate pool ready");

        let selected = self.select(&brief, &pool).await?;
        info!(selected = ?selected, "top candidates selected");

        repair_candidates(self.client.as_ref(), &brief, selected, cfg).await
    }

    /// Breadth call, cleaning, and the single one-shot fallback.
    async fn build_pool(&self, base_prompt: &str) -> Result<CandidatePool, PipelineError> {
        let cfg = self.config.as_ref();
        let format = ad_texts_format(cfg.max_chars);

        let generated = self
            .client
            .request_many(base_prompt, &format, cfg.breadth)
            .await?;

        if let Some(msg) = &generated.error_message {
            return Err(PipelineError::Upstream(msg.clone()));
        }
        if generated.is_success_status() && generated.contents.is_empty() {
            return Err(PipelineError::EmptyResponse {
                stage: Stage::Pool,
                status: generated.status,
            });
        }

        let lists = generated
            .contents
            .iter()
            .filter_map(|c| parse_list(c).into_option());
        let pool = clean(lists, cfg);
        if !pool.is_empty() {
            return Ok(pool);
        }

        warn!(
            status = generated.status,
            choices = generated.contents.len(),
            "cleaned pool is empty; one-shot fallback"
        );
        let fallback = self.client.request_one(base_prompt, &format).await?;
        if let Some(msg) = &fallback.error_message {
            warn!(error = %msg, "fallback generation rejected");
            return Err(PipelineError::PoolExhausted);
        }
        let pool = match fallback.usable_content().map(parse_list) {
            Some(Parsed::Parsed(list)) => CandidatePool::from_unfiltered(list, cfg.pool_cap),
            _ => CandidatePool::default(),
        };
        if pool.is_empty() {
            return Err(PipelineError::PoolExhausted);
        }
        Ok(pool)
    }

    async fn select(
        &self,
        brief: &AdBrief,
        pool: &CandidatePool,
    ) -> Result<Vec<String>, PipelineError> {
        let cfg = self.config.as_ref();
        let prompt = build_selection_prompt(brief, pool, cfg);
        let format = ad_texts_format(cfg.max_chars);

        let reply = self.client.request_one(&prompt, &format).await?;
        if let Some(msg) = reply.error_message.clone() {
            return Err(PipelineError::Upstream(msg));
        }
        let Some(content) = reply.usable_content() else {
            return Err(if reply.is_success_status() {
                PipelineError::EmptyResponse {
                    stage: Stage::Selection,
                    status: reply.status,
                }
            } else {
                PipelineError::ParseFailure
            });
        };

        match parse_list(content) {
            Parsed::Unparsed => Err(PipelineError::ParseFailure),
            Parsed::Parsed(list) if list.len() < RESULT_SIZE => {
                Err(PipelineError::SelectionFailure { got: list.len() })
            }
            Parsed::Parsed(list) => Ok(list
                .into_iter()
                .take(RESULT_SIZE)
                .map(|t| t.trim().to_string())
                .collect()),
        }
    }
}

/// Aborts the invocation task when the caller goes away.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn describe_join_error(err: JoinError) -> String {
    if err.is_panic() {
        let payload = err.into_panic();
        if let Some(s) = payload.downcast_ref::<&str>() {
            return format!("panic: {s}");
        }
        if let Some(s) = payload.downcast_ref::<String>() {
            return format!("panic: {s}");
        }
        return "panic: <non-string payload>".to_string();
    }
    err.to_string()
}
