use crate::completion::CompletionError;
use context_code_chunker::ChunkerError;
use context_graph::GraphError;
use context_syntax::SyntaxError;
use context_vector_store::VectorStoreError;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SummaryError>;

#[derive(Error, Debug)]
pub enum SummaryError {
    /// The completion service failed (or timed out) while summarizing a file
    #[error("Completion failed for {}: {source}", file.display())]
    Completion {
        file: PathBuf,
        #[source]
        source: CompletionError,
    },

    /// A file could not be loaded for summarization
    #[error("Failed to load {}: {source}", file.display())]
    Load {
        file: PathBuf,
        #[source]
        source: SyntaxError,
    },

    /// The task summarizing a file panicked or was cancelled
    #[error("Summarization of {} did not finish: {message}", file.display())]
    TaskFailed { file: PathBuf, message: String },

    /// A review was requested for a file that has no cached summary
    #[error("No summary cached for {}", file.display())]
    MissingSummary { file: PathBuf },

    #[error("Chunker error: {0}")]
    Chunker(#[from] ChunkerError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SummaryError {
    pub fn completion(file: &Path, source: CompletionError) -> Self {
        Self::Completion {
            file: file.to_path_buf(),
            source,
        }
    }

    pub fn load(file: &Path, source: SyntaxError) -> Self {
        Self::Load {
            file: file.to_path_buf(),
            source,
        }
    }

    pub fn task_failed(file: &Path, message: impl Into<String>) -> Self {
        Self::TaskFailed {
            file: file.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn missing_summary(file: &Path) -> Self {
        Self::MissingSummary {
            file: file.to_path_buf(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// File the failure belongs to, for per-file failures
    pub fn file(&self) -> Option<&Path> {
        match self {
            Self::Completion { file, .. }
            | Self::Load { file, .. }
            | Self::TaskFailed { file, .. }
            | Self::MissingSummary { file } => Some(file),
            _ => None,
        }
    }
}
