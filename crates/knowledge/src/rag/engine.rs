//! Question answering over a persisted index.

use crate::embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
use crate::index::SqliteVectorIndex;
use crate::rag::prompt::{build_context, build_messages};
use crate::rag::synthesis::{Generator, Synthesis, SynthesisFailure};
use crate::rag::types::{
    truncate_chars, AnswerStrategy, RagAnswer, RetrievedSource, FALLBACK_ANSWER_CHARS,
};
use crate::types::SearchHit;
use crate::vector_index::VectorIndex;
use assistant_core::{AppError, AppResult, GenerationConfig};
use assistant_llm::LlmClient;
use std::path::Path;
use std::sync::Arc;

/// Sampling temperature for grounded answers.
pub const ANSWER_TEMPERATURE: f32 = 0.2;

/// Token cap for grounded answers.
pub const ANSWER_MAX_TOKENS: u32 = 600;

/// Retrieves passages for a question and answers from them.
///
/// The index is a snapshot taken at construction; re-open the engine (or
/// invalidate its [`crate::rag::EngineHandle`]) to see a newer ingestion.
/// Safe to share across tasks.
pub struct RagQueryEngine {
    index: Box<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Option<Generator>,
}

impl std::fmt::Debug for RagQueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagQueryEngine")
            .field("chunks", &self.index.len())
            .field("embedder", &self.embedder.model_name())
            .field("generator", &self.generator)
            .finish()
    }
}

impl RagQueryEngine {
    /// Open the index in `persist_dir`.
    ///
    /// # Errors
    /// - [`AppError::NotIngested`] when `persist_dir` does not exist
    /// - [`AppError::Config`] for an unknown generation provider
    pub fn open(persist_dir: &Path, generation: &GenerationConfig) -> AppResult<Self> {
        let index = SqliteVectorIndex::open(persist_dir)?;
        let embedding = index.embedding_config().cloned().unwrap_or_default();
        let embedder = create_provider(&embedding)?;
        let generator = Generator::from_config(generation)?;

        tracing::info!(
            "Opened query engine over {} chunks (model: {}, generation: {})",
            index.len(),
            embedding.identifier(),
            generator
                .as_ref()
                .map(|g| g.provider_name().to_string())
                .unwrap_or_else(|| "none".to_string())
        );

        Ok(Self::from_parts(Box::new(index), embedder, generator))
    }

    /// Assemble an engine from its collaborators.
    pub fn from_parts(
        index: Box<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Option<Generator>,
    ) -> Self {
        Self {
            index,
            embedder,
            generator,
        }
    }

    /// Use `client` for synthesis.
    pub fn with_generator(mut self, client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        self.generator = Some(Generator::new(client, model));
        self
    }

    /// Answer extractively only.
    pub fn without_generator(mut self) -> Self {
        self.generator = None;
        self
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Number of chunks in the snapshot.
    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    pub fn embedding_config(&self) -> EmbeddingConfig {
        self.index.embedding_config().cloned().unwrap_or_default()
    }

    /// Answer `question` from at most `top_k` retrieved chunks.
    ///
    /// Generation failures never surface as errors; the answer falls back to
    /// the top chunk, or to the no-match sentinel when nothing was retrieved.
    ///
    /// # Errors
    /// - [`AppError::InvalidInput`] when `top_k` is zero
    /// - embedding or index errors while retrieving
    pub async fn answer_question(&self, question: &str, top_k: usize) -> AppResult<RagAnswer> {
        if top_k == 0 {
            return Err(AppError::InvalidInput(
                "top_k must be at least 1".to_string(),
            ));
        }

        let hits = self.retrieve(question, top_k).await?;
        let Some(top) = hits.first() else {
            tracing::info!("No chunks retrieved for question");
            return Ok(RagAnswer::no_match());
        };

        let sources: Vec<RetrievedSource> = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| RetrievedSource::from_hit(i + 1, hit))
            .collect();

        let synthesis = self.synthesize(question, &hits).await;
        let (answer, strategy) = match synthesis {
            Synthesis::Generated(text) => (text, AnswerStrategy::Synthesized),
            Synthesis::Unavailable(reason) => {
                match &reason {
                    SynthesisFailure::NotConfigured => {
                        tracing::debug!("Answering extractively: {}", reason)
                    }
                    _ => tracing::warn!("Synthesis unavailable, answering extractively: {}", reason),
                }
                (
                    truncate_chars(&top.chunk.content, FALLBACK_ANSWER_CHARS).to_string(),
                    AnswerStrategy::Extractive,
                )
            }
        };

        tracing::info!(
            strategy = strategy.as_str(),
            sources = sources.len(),
            "Answered question"
        );

        Ok(RagAnswer {
            answer,
            sources,
            strategy,
        })
    }

    /// Nearest chunks to `question`, most similar first.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> AppResult<Vec<SearchHit>> {
        if self.index.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(question).await?;
        let hits = self.index.search(&query_embedding, top_k)?;

        tracing::debug!(
            "Retrieved {} chunks (best distance: {:.3})",
            hits.len(),
            hits.first().map_or(f32::NAN, |h| h.distance)
        );

        Ok(hits)
    }

    async fn synthesize(&self, question: &str, hits: &[SearchHit]) -> Synthesis {
        if hits.is_empty() {
            return Synthesis::Unavailable(SynthesisFailure::NoContext);
        }
        let Some(generator) = &self.generator else {
            return Synthesis::Unavailable(SynthesisFailure::NotConfigured);
        };

        let context = build_context(hits);
        generator
            .generate(
                build_messages(question, &context),
                ANSWER_TEMPERATURE,
                ANSWER_MAX_TOKENS,
            )
            .await
    }
}
