use serde::{Deserialize, Serialize};

/// A window of a file's tokenized content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeChunk {
    /// Source file path
    pub file_path: String,

    /// Position of this chunk within its file (1-indexed)
    pub index: usize,

    /// First token offset (inclusive)
    pub start_token: usize,

    /// Last token offset (exclusive)
    pub end_token: usize,

    /// Start line (1-indexed)
    pub start_line: usize,

    /// End line (1-indexed, inclusive)
    pub end_line: usize,

    /// The content slice covered by the window
    pub content: String,

    /// Summary produced for this chunk, filled in by the summarization pipeline
    #[serde(default)]
    pub summary: Option<String>,
}

impl CodeChunk {
    /// Get the number of tokens in this chunk
    #[must_use]
    pub const fn token_count(&self) -> usize {
        self.end_token.saturating_sub(self.start_token)
    }

    /// Get the number of lines in this chunk
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Check if chunk contains a specific line
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    /// Stable identifier: `path#index`
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}#{}", self.file_path, self.index)
    }

    /// Builder: attach a summary
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk() -> CodeChunk {
        CodeChunk {
            file_path: "a.py".to_string(),
            index: 2,
            start_token: 10,
            end_token: 25,
            start_line: 3,
            end_line: 5,
            content: "code".to_string(),
            summary: None,
        }
    }

    #[test]
    fn test_counts() {
        let chunk = chunk();
        assert_eq!(chunk.token_count(), 15);
        assert_eq!(chunk.line_count(), 3);
        assert!(chunk.contains_line(3));
        assert!(chunk.contains_line(5));
        assert!(!chunk.contains_line(6));
    }

    #[test]
    fn test_id_and_summary() {
        let chunk = chunk().with_summary("does things");
        assert_eq!(chunk.id(), "a.py#2");
        assert_eq!(chunk.summary.as_deref(), Some("does things"));
    }

    #[test]
    fn test_summary_defaults_when_missing_from_json() {
        let json = r#"{"file_path":"a.py","index":1,"start_token":0,"end_token":1,
            "start_line":1,"end_line":1,"content":"x"}"#;
        let chunk: CodeChunk = serde_json::from_str(json).unwrap();
        assert!(chunk.summary.is_none());
    }
}
