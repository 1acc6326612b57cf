use thiserror::Error;

/// Main error type for textgraph
#[derive(Error, Debug)]
pub enum TextgraphError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors (missing credential, bad values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (malformed triple batch, unreadable upload)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Extraction API errors
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Artifact serialization or write errors
    #[error("Render error: {0}")]
    Render(String),
}

impl TextgraphError {
    /// True for errors caused by what the user supplied rather than by the system.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, TextgraphError::InvalidInput(_))
    }
}

/// Convenient Result type using TextgraphError
pub type Result<T> = std::result::Result<T, TextgraphError>;
