//! # Context Code Chunker
//!
//! Token-window chunking of source files for summarization.
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     │
//!     ├──> Tokenize (Unicode word boundaries, lossless)
//!     │
//!     └──> Windowing
//!          ├─> window of `chunk_size` tokens
//!          ├─> advance by `chunk_size - chunk_overlap`
//!          └─> stop once a window reaches the last token
//! ```
//!
//! Adjacent windows share exactly `chunk_overlap` tokens, and the union of
//! all windows covers every token of the input.
//!
//! ## Example
//!
//! ```rust
//! use context_code_chunker::{Chunker, ChunkerConfig};
//!
//! let chunker = Chunker::new(ChunkerConfig::new(6, 2)).unwrap();
//! let chunks = chunker.chunk_str("a b c d e f g", "example.txt");
//!
//! assert_eq!(chunks.len(), 3);
//! assert_eq!(chunks[0].content, "a b c ");
//! assert_eq!(chunks[1].content, "c d e ");
//! ```

mod chunker;
mod config;
mod error;
mod types;

pub use chunker::{Chunker, ChunkingStats};
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
pub use types::CodeChunk;
