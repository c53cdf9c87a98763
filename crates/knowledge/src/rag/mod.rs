//! Retrieval-augmented question answering.
//!
//! Retrieves the chunks nearest to a question, numbers them as citations and
//! asks the generation backend for a grounded answer. Without a usable
//! backend the top chunk itself is the answer.

pub mod engine;
pub mod handle;
pub mod prompt;
pub mod synthesis;
pub mod types;

pub use engine::RagQueryEngine;
pub use handle::EngineHandle;
pub use synthesis::{Generator, Synthesis, SynthesisFailure};
pub use types::{AnswerStrategy, RagAnswer, RetrievedSource, NO_MATCH_ANSWER};
