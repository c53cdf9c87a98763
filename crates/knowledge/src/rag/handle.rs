//! Shared, lazily opened query engine.

use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::rag::engine::RagQueryEngine;
use crate::rag::types::RagAnswer;
use assistant_core::{AppError, AppResult, GenerationConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Owns the query engine for a long-running caller.
///
/// The engine is opened on first use and then shared. A failed open is not
/// remembered, so a later call retries (for example once ingestion has run).
/// [`EngineHandle::invalidate`] drops the engine after a re-ingestion.
pub struct EngineHandle {
    persist_dir: PathBuf,
    generation: GenerationConfig,
    engine: RwLock<Option<Arc<RagQueryEngine>>>,
    sink: Option<Arc<dyn AnalyticsSink>>,
}

impl EngineHandle {
    pub fn new(persist_dir: impl AsRef<Path>, generation: GenerationConfig) -> Self {
        Self {
            persist_dir: persist_dir.as_ref().to_path_buf(),
            generation,
            engine: RwLock::new(None),
            sink: None,
        }
    }

    /// Report each answered question to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The shared engine, opening it if needed.
    pub async fn get(&self) -> AppResult<Arc<RagQueryEngine>> {
        if let Some(engine) = self.engine.read().await.as_ref() {
            return Ok(Arc::clone(engine));
        }

        let mut slot = self.engine.write().await;
        if let Some(engine) = slot.as_ref() {
            return Ok(Arc::clone(engine));
        }

        // Opening reads every stored chunk through rusqlite.
        let persist_dir = self.persist_dir.clone();
        let generation = self.generation.clone();
        let engine = tokio::task::spawn_blocking(move || {
            RagQueryEngine::open(&persist_dir, &generation)
        })
        .await
        .map_err(|e| AppError::Other(format!("Query engine open task failed: {}", e)))??;

        let engine = Arc::new(engine);
        *slot = Some(Arc::clone(&engine));
        Ok(engine)
    }

    /// Install an already built engine.
    pub async fn set(&self, engine: RagQueryEngine) {
        *self.engine.write().await = Some(Arc::new(engine));
    }

    /// Drop the cached engine; the next call re-opens the index.
    pub async fn invalidate(&self) {
        if self.engine.write().await.take().is_some() {
            tracing::debug!("Dropped cached query engine");
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.engine.read().await.is_some()
    }

    /// Answer through the shared engine and report the question to the sink.
    pub async fn answer_question(&self, question: &str, top_k: usize) -> AppResult<RagAnswer> {
        let answer = self.get().await?.answer_question(question, top_k).await?;

        if let Some(sink) = &self.sink {
            sink.track(&AnalyticsEvent::chat(question, top_k));
        }

        Ok(answer)
    }
}
