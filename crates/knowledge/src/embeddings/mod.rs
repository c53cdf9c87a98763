//! Text embedding for chunks and queries.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use crate::types::Chunk;
use assistant_core::{AppError, AppResult};

/// Embed chunk contents in order, checking count and width of the result.
pub async fn embed_chunks(
    provider: &dyn EmbeddingProvider,
    chunks: &[Chunk],
) -> AppResult<Vec<Vec<f32>>> {
    if chunks.is_empty() {
        return Ok(Vec::new());
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();

    tracing::info!(
        "Embedding {} chunks using provider '{}' (model: {})",
        texts.len(),
        provider.provider_name(),
        provider.model_name()
    );

    let embeddings = provider.embed_batch(&texts).await?;

    if embeddings.len() != chunks.len() {
        return Err(AppError::Embedding(format!(
            "Provider returned {} embeddings for {} chunks",
            embeddings.len(),
            chunks.len()
        )));
    }

    if let Some(bad) = embeddings
        .iter()
        .find(|e| e.len() != provider.dimensions())
    {
        return Err(AppError::Embedding(format!(
            "Unexpected embedding dimensions: got {}, expected {}",
            bad.len(),
            provider.dimensions()
        )));
    }

    tracing::debug!(
        "Generated {} embeddings of dimension {}",
        embeddings.len(),
        provider.dimensions()
    );

    Ok(embeddings)
}
