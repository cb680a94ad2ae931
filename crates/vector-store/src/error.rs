use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

/// Failures of the embedding and index seams
#[derive(Error, Debug)]
pub enum VectorStoreError {
    /// The embedding backend could not produce a vector
    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A persisted index could not be read or written as JSON
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A vector's length does not match the index dimension
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },
}
