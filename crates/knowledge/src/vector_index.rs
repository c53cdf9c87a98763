//! Vector index abstraction for retrieval.

use crate::embeddings::EmbeddingConfig;
use crate::types::SearchHit;
use assistant_core::AppResult;

/// A read-only, searchable snapshot of embedded chunks.
pub trait VectorIndex: Send + Sync {
    /// The `top_k` chunks nearest to `query_embedding`, ascending by distance.
    ///
    /// Returns fewer when the index holds fewer chunks. Equal distances keep
    /// the order in which chunks were ingested.
    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<SearchHit>>;

    /// Number of chunks in the index.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding model the index was built with, or `None` if nothing was written yet.
    fn embedding_config(&self) -> Option<&EmbeddingConfig>;
}
