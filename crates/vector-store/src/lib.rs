//! # Context Vector Store
//!
//! Seams for publishing file summaries to a similarity index.
//!
//! ## Architecture
//!
//! ```text
//! File summary
//!     │
//!     ├──> EmbeddingService
//!     │      └─> Vector[dimension]
//!     │
//!     └──> SummaryIndex
//!            ├─> upsert(id, vector, metadata)
//!            └─> search(vector, limit)
//! ```
//!
//! `StubEmbedder` and `InMemoryIndex` are self-contained implementations;
//! real backends implement the same traits.
//!
//! ## Example
//!
//! ```rust
//! use context_vector_store::{
//!     EmbeddingService, InMemoryIndex, StubEmbedder, SummaryIndex, SummaryMetadata,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let embedder = StubEmbedder::default();
//!     let index = InMemoryIndex::new(embedder.dimension());
//!
//!     let summary = "Parses the configuration file";
//!     let vector = embedder.embed(summary).await?;
//!     let metadata = SummaryMetadata {
//!         path: "config.py".to_string(),
//!         language: "python".to_string(),
//!         dependencies: vec![],
//!         summary: summary.to_string(),
//!     };
//!     index.upsert("config.py", vector.clone(), metadata).await?;
//!
//!     let results = index.search(&vector, 5).await?;
//!     assert_eq!(results[0].id, "config.py");
//!     Ok(())
//! }
//! ```

mod embeddings;
mod error;
mod store;
mod types;

pub use embeddings::{cosine_similarity, EmbeddingService, StubEmbedder};
pub use error::{Result, VectorStoreError};
pub use store::{InMemoryIndex, SummaryIndex};
pub use types::{SearchResult, StoredSummary, SummaryMetadata};
