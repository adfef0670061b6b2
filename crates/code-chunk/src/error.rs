use thiserror::Error;

/// Result type for chunker operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors that can occur during code chunking
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// No grammar is available for the requested or detected language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The parser itself failed (as opposed to producing a tree with error nodes)
    #[error("Parse failed: {0}")]
    ParseFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The batch was cancelled before this file was processed
    #[error("Cancelled before processing")]
    Cancelled,

    /// A batch worker panicked while processing a file
    #[error("Worker task failed: {0}")]
    TaskFailed(String),
}

impl ChunkerError {
    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create a parse failure error
    pub fn parse_failed(msg: impl Into<String>) -> Self {
        Self::ParseFailed(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for the error kinds that mean "no grammar for this input"
    #[must_use]
    pub const fn is_unsupported_language(&self) -> bool {
        matches!(self, Self::UnsupportedLanguage(_))
    }
}
