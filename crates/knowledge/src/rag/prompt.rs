//! Prompt assembly for grounded answers.

use crate::types::SearchHit;
use assistant_llm::ChatMessage;

/// Instruction sent with every synthesis request.
pub const SYSTEM_PROMPT: &str = "You are an employee assistant answering questions about company \
policies and documents. Answer using only the given context. If the context does not contain the \
answer, say that you are not sure. Cite the context you relied on with bracketed numbers such as \
[1] that match the numbered context entries.";

/// Numbered context: `[1] <chunk>` entries separated by blank lines, in hit order.
///
/// Numbering matches [`crate::rag::RetrievedSource::index`] for the same hits.
pub fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| format!("[{}] {}", i + 1, hit.chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Messages for one synthesis request.
pub fn build_messages(question: &str, context: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Context:\n{}\n\nQuestion: {}\n\nAnswer:",
            context, question
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ChunkMetadata};
    use assistant_llm::ChatRole;

    fn hit(content: &str) -> SearchHit {
        SearchHit {
            chunk: Chunk {
                content: content.to_string(),
                metadata: ChunkMetadata::new("doc", 0),
            },
            distance: 0.0,
        }
    }

    #[test]
    fn test_build_context_numbering() {
        let context = build_context(&[hit("alpha"), hit("beta"), hit("gamma")]);
        assert_eq!(context, "[1] alpha\n\n[2] beta\n\n[3] gamma");
    }

    #[test]
    fn test_build_context_empty() {
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn test_build_messages() {
        let messages = build_messages("How many leave days?", "[1] Twenty.");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert!(messages[0].content.contains("bracketed numbers"));
        assert_eq!(messages[1].role, ChatRole::User);
        assert!(messages[1].content.contains("[1] Twenty."));
        assert!(messages[1].content.contains("Question: How many leave days?"));
    }
}
