use context_syntax::SyntaxError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    /// No resolution strategy (or no grammar) for this language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Syntax error: {0}")]
    Syntax(SyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid project root: {0}")]
    InvalidRoot(String),
}

impl GraphError {
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Whether this failure only concerns a single file
    ///
    /// Grammar or query failures affect every file of a language and are not.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedLanguage(_) | Self::Io(_) | Self::Syntax(SyntaxError::ParseError(_))
        )
    }
}

impl From<SyntaxError> for GraphError {
    fn from(err: SyntaxError) -> Self {
        match err {
            SyntaxError::UnsupportedLanguage(lang) => Self::UnsupportedLanguage(lang),
            SyntaxError::IoError(io) => Self::Io(io),
            other => Self::Syntax(other),
        }
    }
}
