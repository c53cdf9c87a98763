//! Embedding model identifiers and their resolved configuration.

use assistant_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Identifier of the built-in offline embedder.
pub const TRIGRAM_MODEL: &str = "trigram-v1";

/// Dimensions produced by the built-in offline embedder.
pub const TRIGRAM_DIMENSIONS: usize = 384;

const OLLAMA_PREFIX: &str = "ollama:";

/// Known Ollama embedding models and their output width.
const OLLAMA_DIMENSIONS: &[(&str, usize)] = &[
    ("all-minilm", 384),
    ("nomic-embed-text", 768),
    ("mxbai-embed-large", 1024),
];

/// Resolved embedding configuration.
///
/// Built from a model identifier such as `trigram-v1`, `ollama:nomic-embed-text`
/// or `ollama:my-model@512`. The identifier is persisted with the index so that
/// queries are embedded by the same model the corpus was embedded with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: TRIGRAM_MODEL.to_string(),
            dimensions: TRIGRAM_DIMENSIONS,
        }
    }
}

impl EmbeddingConfig {
    /// Resolve a model identifier.
    pub fn for_model(name: &str) -> AppResult<Self> {
        let name = name.trim();

        if name == TRIGRAM_MODEL || name == "trigram" {
            return Ok(Self::default());
        }

        if let Some(rest) = name.strip_prefix(OLLAMA_PREFIX) {
            return Self::ollama(rest);
        }

        Err(AppError::Config(format!(
            "Unknown embedding model: '{}'. Supported: {}, {}<model>[@<dims>]",
            name, TRIGRAM_MODEL, OLLAMA_PREFIX
        )))
    }

    fn ollama(descriptor: &str) -> AppResult<Self> {
        let (model, dimensions) = match descriptor.rsplit_once('@') {
            Some((model, dims)) => {
                let dims = dims.parse::<usize>().map_err(|_| {
                    AppError::Config(format!("Invalid embedding dimensions in '{}'", descriptor))
                })?;
                (model, dims)
            }
            None => {
                let base = descriptor.split(':').next().unwrap_or(descriptor);
                let dims = OLLAMA_DIMENSIONS
                    .iter()
                    .find(|(known, _)| *known == base)
                    .map(|(_, dims)| *dims)
                    .ok_or_else(|| {
                        AppError::Config(format!(
                            "Unknown dimensions for Ollama model '{}'. Use {}{}@<dims>",
                            descriptor, OLLAMA_PREFIX, descriptor
                        ))
                    })?;
                (descriptor, dims)
            }
        };

        if model.is_empty() {
            return Err(AppError::Config(
                "Ollama embedding model name is empty".to_string(),
            ));
        }
        if dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            provider: "ollama".to_string(),
            model: model.to_string(),
            dimensions,
        })
    }

    /// Canonical identifier, accepted back by [`EmbeddingConfig::for_model`].
    pub fn identifier(&self) -> String {
        match self.provider.as_str() {
            "ollama" => format!("{}{}@{}", OLLAMA_PREFIX, self.model, self.dimensions),
            _ => self.model.clone(),
        }
    }

    /// Validate that another config is consistent with this one.
    pub fn validate_consistency(&self, other: &Self) -> AppResult<()> {
        if self.provider != other.provider || self.model != other.model {
            return Err(AppError::Embedding(format!(
                "Model mismatch: index was built with '{}', got '{}'",
                self.identifier(),
                other.identifier()
            )));
        }

        if self.dimensions != other.dimensions {
            return Err(AppError::Embedding(format!(
                "Dimension mismatch: expected {}, got {}",
                self.dimensions, other.dimensions
            )));
        }

        Ok(())
    }
}
