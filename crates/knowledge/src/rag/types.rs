//! Query result types.

use crate::types::{ChunkMetadata, SearchHit};
use serde::Serialize;

/// Retrieval fan-out when the caller has no preference.
pub const DEFAULT_TOP_K: usize = 4;

/// Maximum snippet length for source references, in characters.
pub const SNIPPET_CHARS: usize = 300;

/// Maximum length of an extractive answer, in characters.
pub const FALLBACK_ANSWER_CHARS: usize = 800;

/// Answer returned when retrieval finds nothing.
pub const NO_MATCH_ANSWER: &str = "No relevant information found in the knowledge base.";

/// One retrieved passage, as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedSource {
    /// Citation number, 1-based, equal to retrieval rank
    pub index: usize,

    /// Leading characters of the chunk
    pub snippet: String,

    /// Provenance of the chunk
    pub metadata: ChunkMetadata,

    #[serde(skip_serializing)]
    pub distance: f32,
}

impl RetrievedSource {
    pub fn from_hit(index: usize, hit: &SearchHit) -> Self {
        Self {
            index,
            snippet: truncate_chars(&hit.chunk.content, SNIPPET_CHARS).to_string(),
            metadata: hit.chunk.metadata.clone(),
            distance: hit.distance,
        }
    }
}

/// How an answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStrategy {
    /// Written by the generation backend from the retrieved context
    Synthesized,
    /// The top-ranked chunk, truncated
    Extractive,
    /// Nothing was retrieved
    NoMatch,
}

impl AnswerStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStrategy::Synthesized => "synthesized",
            AnswerStrategy::Extractive => "extractive",
            AnswerStrategy::NoMatch => "no_match",
        }
    }
}

/// Answer to a question with its citations.
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub answer: String,

    /// Sources in citation order; `sources[i].index == i + 1`
    pub sources: Vec<RetrievedSource>,

    #[serde(skip_serializing)]
    pub strategy: AnswerStrategy,
}

impl RagAnswer {
    /// The sentinel answer for an empty retrieval.
    pub fn no_match() -> Self {
        Self {
            answer: NO_MATCH_ANSWER.to_string(),
            sources: Vec::new(),
            strategy: AnswerStrategy::NoMatch,
        }
    }
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
