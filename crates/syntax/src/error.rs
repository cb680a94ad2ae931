use thiserror::Error;

/// Result type for syntax operations
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Errors that can occur while loading, parsing or querying source files
#[derive(Error, Debug)]
pub enum SyntaxError {
    /// No grammar (or no detection rule) exists for the language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The parser gave up on the input
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A query pattern failed to compile against the grammar
    #[error("Invalid query for {language}: {message}")]
    Query { language: String, message: String },

    /// Tree-sitter rejected the grammar
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SyntaxError {
    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }
}
