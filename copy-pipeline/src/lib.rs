//! Ad-copy pipeline: breadth generation, selection, validation and bounded repair.
//!
//! Entry point is [`pipeline::AdCopyPipeline::generate`], which always returns
//! an [`envelope::AdCopyResponse`]. A successful response holds exactly three
//! texts, each within the configured length, free of banned substrings, and
//! pairwise below the 2-gram similarity threshold.

pub mod config;
pub mod envelope;
pub mod error;
pub mod parse;
pub mod pipeline;
pub mod pool;
pub mod prompt;
pub mod request;
pub mod rewrite;
pub mod schema;
pub mod validate;

pub use config::PipelineConfig;
pub use envelope::{AdCopyResponse, ResponseMeta};
pub use error::PipelineError;
pub use pipeline::AdCopyPipeline;
pub use request::GenerationRequest;
