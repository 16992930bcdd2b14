//! Error types for reviewbuddy
//!
//! Library code returns [`Result`] with [`RagError`]; the binary wraps these
//! in `anyhow` at the edges.

use thiserror::Error;

/// Main error type for the review question-answering pipeline
#[derive(Error, Debug)]
pub enum RagError {
    /// Dataset file does not exist
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    /// Dataset is missing a required header
    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),

    /// Malformed CSV content
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Ollama API errors
    #[error("Ollama API error: {0}")]
    OllamaApiError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Vector store errors
    #[error("Vector store error: {0}")]
    VectorStoreError(String),

    /// Index was built with another embedding model
    #[error(
        "Index was built with embedding model '{found}' but '{expected}' is configured; \
         run `reviewbuddy index --rebuild`"
    )]
    EmbeddingModelMismatch { expected: String, found: String },

    /// Vector length does not match the collection
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Blank query text
    #[error("Query must not be empty")]
    EmptyQuery,

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RagError>;

impl From<anyhow::Error> for RagError {
    fn from(err: anyhow::Error) -> Self {
        RagError::Generic(err.to_string())
    }
}
