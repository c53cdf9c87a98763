//! Knowledge system type definitions.

use assistant_core::ChunkingConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An extracted plain-text document, identified by the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Stable identifier derived from the originating file name
    pub source_name: String,

    /// Full extracted text, already stripped of surrounding whitespace
    pub text: String,
}

/// Provenance attached to every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Identifier of the document the chunk came from
    pub source_name: String,

    /// Back-reference to the original file for display
    pub raw_url: String,

    /// Chunk position within its document (0-indexed)
    pub position: u32,
}

impl ChunkMetadata {
    pub fn new(source_name: impl Into<String>, position: u32) -> Self {
        let source_name = source_name.into();
        Self {
            raw_url: raw_url_for(&source_name),
            source_name,
            position,
        }
    }
}

/// Static link to the original upload; existence is not checked.
pub fn raw_url_for(source_name: &str) -> String {
    format!("/files/{}.pdf", source_name)
}

/// A contiguous slice of a document: the unit stored in and retrieved from the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content, never trimmed
    pub content: String,

    /// Provenance
    pub metadata: ChunkMetadata,
}

/// A chunk returned by a similarity search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk: Chunk,

    /// Cosine distance to the query (0.0 = identical direction)
    pub distance: f32,
}

/// Options for an ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Directory of extracted `.txt` documents
    pub processed_dir: PathBuf,

    /// Directory receiving the persisted index
    pub persist_dir: PathBuf,

    /// Embedding model identifier
    pub model_name: String,

    /// Chunk window settings
    pub chunking: ChunkingConfig,
}

impl IngestOptions {
    pub fn new(processed_dir: impl AsRef<Path>, persist_dir: impl AsRef<Path>) -> Self {
        Self {
            processed_dir: processed_dir.as_ref().to_path_buf(),
            persist_dir: persist_dir.as_ref().to_path_buf(),
            model_name: assistant_core::config::DEFAULT_EMBEDDING_MODEL.to_string(),
            chunking: ChunkingConfig::default(),
        }
    }

    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }
}

/// A document that could not be read during ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Non-empty documents chunked
    pub documents: u32,

    /// Chunks embedded and written
    pub chunks: u32,

    /// Documents that were empty after stripping whitespace
    pub empty_documents: u32,

    /// Documents that failed to read
    pub skipped: Vec<SkippedDocument>,

    /// Whether a new index replaced the previous one
    pub index_written: bool,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Statistics for a persisted index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Index directory
    pub persist_dir: PathBuf,

    /// Number of distinct source documents
    pub documents_count: u32,

    /// Number of chunks
    pub chunks_count: u32,

    /// Embedding model identifier, if an index has been written
    pub model: Option<String>,

    /// Embedding dimensions, if an index has been written
    pub dimensions: Option<usize>,

    /// When the index was built
    pub built_at: Option<DateTime<Utc>>,

    /// Database size in bytes
    pub db_size_bytes: u64,
}
