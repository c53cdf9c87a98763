//! Error types for the Employee Assistant.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, generation backends, embeddings,
//! the persisted vector index, and the knowledge pipelines built on top.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for the Employee Assistant.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic on recoverable conditions; errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generation backend errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding model errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index read/write errors
    #[error("Index error: {0}")]
    Index(String),

    /// Ingestion and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Caller supplied an argument outside its valid range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The vector index has never been built at this location
    #[error("Vectorstore not found at {}. Ingest documents first.", path.display())]
    NotIngested { path: PathBuf },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether this error means ingestion has not run yet.
    pub fn is_not_ingested(&self) -> bool {
        matches!(self, AppError::NotIngested { .. })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
