//! # Context Summarizer
//!
//! Dependency-aware summarization of a source tree.
//!
//! ## Architecture
//!
//! ```text
//! DependencyGraph + ProcessingOrder
//!     │
//!     ├──> SummaryPipeline (leaves first)
//!     │      ├─ Context: cached summaries of direct dependencies
//!     │      ├─ Chunk prompts: one completion per token window
//!     │      └─ Combine prompt: chunk summaries -> file summary
//!     │
//!     ├──> SummaryCache (path -> summary, written once, resumable)
//!     │
//!     ├──> review_file (evaluation of a cached summary against its code)
//!     │
//!     └──> publish_summaries
//!            └─ EmbeddingService + SummaryIndex
//! ```
//!
//! The completion backend is a [`CompletionService`]; retries and rate limits
//! belong to the implementation. Each call is bounded by the configured
//! timeout and a failure only affects the file being summarized.
//!
//! ## Example
//!
//! ```rust,no_run
//! use context_graph::DependencyGraphBuilder;
//! use context_summarizer::{
//!     CompletionError, CompletionService, SummarizerConfig, SummaryCache, SummaryPipeline,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct Backend;
//!
//! #[async_trait::async_trait]
//! impl CompletionService for Backend {
//!     async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
//!         Ok(format!("{} characters of prompt", prompt.len()))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let root = Path::new("my-project");
//!     let files = context_graph::FileScanner::new(root).scan();
//!     let build = DependencyGraphBuilder::new().build(&files, root)?;
//!
//!     let config = SummarizerConfig::default().apply_env_overrides();
//!     let pipeline = SummaryPipeline::new(&config, Arc::new(Backend))?;
//!     let cache = SummaryCache::load_or_default("summaries.json").await?;
//!
//!     let outcome = pipeline.run(&build.graph, &build.order, &cache).await;
//!     cache.save("summaries.json").await?;
//!     println!("{} files summarized", outcome.summarized.len());
//!     Ok(())
//! }
//! ```

mod cache;
mod completion;
mod config;
mod error;
mod pipeline;
mod prompt;
mod publish;

pub use cache::SummaryCache;
pub use completion::{CompletionError, CompletionService};
pub use config::{
    SummarizerConfig, ENV_CHUNK_OVERLAP, ENV_CHUNK_SIZE, ENV_COMPLETION_TIMEOUT_MS,
    ENV_MAX_IN_FLIGHT,
};
pub use error::{Result, SummaryError};
pub use pipeline::{FileSummary, PipelineOutcome, SummaryPipeline, SummaryReview};
pub use prompt::{format_chunk_summaries, format_context, PromptTemplates};
pub use publish::publish_summaries;
