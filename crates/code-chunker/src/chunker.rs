use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::types::CodeChunk;
use context_syntax::SourceFile;
use std::path::Path;
use unicode_segmentation::UnicodeSegmentation;

/// Splits file content into overlapping token windows
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker, rejecting invalid window configurations up front
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self { config })
    }

    /// Split content into atomic tokens (Unicode word boundaries)
    ///
    /// Concatenating the tokens reproduces the input exactly.
    #[must_use]
    pub fn tokenize(content: &str) -> Vec<&str> {
        content.split_word_bounds().collect()
    }

    /// Chunk code from a string
    #[must_use]
    pub fn chunk_str(&self, content: &str, file_path: &str) -> Vec<CodeChunk> {
        let tokens = Self::tokenize(content);
        if tokens.is_empty() {
            return Vec::new();
        }

        // byte_offsets[i] is where token i starts; the extra entry marks the end
        let mut byte_offsets = Vec::with_capacity(tokens.len() + 1);
        // newlines_before[i] counts line breaks in tokens[..i]
        let mut newlines_before = Vec::with_capacity(tokens.len());
        let mut offset = 0;
        let mut newlines = 0;
        for token in &tokens {
            byte_offsets.push(offset);
            newlines_before.push(newlines);
            offset += token.len();
            newlines += token.matches('\n').count();
        }
        byte_offsets.push(offset);

        let size = self.config.chunk_size;
        let stride = self.config.stride();
        let total = tokens.len();

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + size).min(total);
            chunks.push(CodeChunk {
                file_path: file_path.to_string(),
                index: chunks.len() + 1,
                start_token: start,
                end_token: end,
                start_line: newlines_before[start] + 1,
                end_line: newlines_before[end - 1] + 1,
                content: content[byte_offsets[start]..byte_offsets[end]].to_string(),
                summary: None,
            });

            if end == total {
                break;
            }
            start += stride;
        }

        log::trace!(
            "{file_path}: {total} tokens -> {} chunk(s) (size={size}, overlap={})",
            chunks.len(),
            self.config.chunk_overlap
        );

        chunks
    }

    /// Chunk code from a file; invalid UTF-8 is decoded lossily
    pub fn chunk_file(&self, path: impl AsRef<Path>) -> Result<Vec<CodeChunk>> {
        let path = path.as_ref();
        let content = SourceFile::new(path).load()?;
        let file_path = path.to_string_lossy();
        Ok(self.chunk_str(&content, &file_path))
    }

    /// Token range of one chunk re-derived from the tokenized content
    pub fn token_slice<'a>(tokens: &'a [&'a str], chunk: &CodeChunk) -> Result<&'a [&'a str]> {
        if chunk.start_token >= chunk.end_token || chunk.end_token > tokens.len() {
            return Err(ChunkerError::InvalidBoundaries {
                start: chunk.start_token,
                end: chunk.end_token,
            });
        }
        Ok(&tokens[chunk.start_token..chunk.end_token])
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Get statistics about chunking
    #[must_use]
    pub fn get_stats(chunks: &[CodeChunk]) -> ChunkingStats {
        let sizes = || chunks.iter().map(CodeChunk::token_count);
        ChunkingStats {
            total_chunks: chunks.len(),
            total_tokens: chunks.iter().map(|c| c.end_token).max().unwrap_or(0),
            avg_tokens_per_chunk: if chunks.is_empty() {
                0
            } else {
                sizes().sum::<usize>() / chunks.len()
            },
            min_tokens: sizes().min().unwrap_or(0),
            max_tokens: sizes().max().unwrap_or(0),
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
        }
    }
}

/// Statistics about chunking results
#[derive(Debug, Clone)]
pub struct ChunkingStats {
    pub total_chunks: usize,
    /// Distinct tokens covered by the chunks of a single file
    pub total_tokens: usize,
    pub avg_tokens_per_chunk: usize,
    pub min_tokens: usize,
    pub max_tokens: usize,
}

impl std::fmt::Display for ChunkingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} | Tokens: {} | Avg: {} | Range: {}-{}",
            self.total_chunks,
            self.total_tokens,
            self.avg_tokens_per_chunk,
            self.min_tokens,
            self.max_tokens
        )
    }
}
