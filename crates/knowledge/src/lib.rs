//! Document knowledge base and retrieval-augmented answering.
//!
//! Ingestion turns a directory of extracted `.txt` documents into a persisted
//! SQLite vector index. The query engine retrieves the nearest chunks for a
//! question and answers from them, with citations.

pub mod analytics;
pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod forms;
pub mod index;
pub mod ingest;
pub mod rag;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use analytics::{top_queries, AnalyticsEvent, AnalyticsSink, JsonlSink, QueryCount, TracingSink};
pub use embeddings::EmbeddingConfig;
pub use forms::explain_form;
pub use index::SqliteVectorIndex;
pub use ingest::{build_vectorstore, build_vectorstore_with};
pub use rag::{
    AnswerStrategy, EngineHandle, Generator, RagAnswer, RagQueryEngine, RetrievedSource,
    NO_MATCH_ANSWER,
};
pub use types::{Chunk, ChunkMetadata, Document, IndexStats, IngestOptions, IngestReport};
pub use vector_index::VectorIndex;

use assistant_core::AppResult;
use std::path::Path;

/// Statistics for the index in `persist_dir`.
pub fn stats(persist_dir: &Path) -> AppResult<IndexStats> {
    Ok(SqliteVectorIndex::open(persist_dir)?.stats())
}
