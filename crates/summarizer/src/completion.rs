use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Rate limited by completion service")]
    RateLimited,

    #[error("Completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("Completion service error: {0}")]
    Service(String),
}

/// Text-generation backend
///
/// Retries and rate limiting are the implementation's concern; the pipeline
/// calls `complete` once per prompt.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[async_trait]
impl<T: CompletionService + ?Sized> CompletionService for Arc<T> {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        (**self).complete(prompt).await
    }
}
