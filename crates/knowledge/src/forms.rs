//! Field-by-field explanation of extracted form text.

use crate::rag::synthesis::{Generator, Synthesis};
use crate::rag::types::truncate_chars;
use assistant_llm::ChatMessage;

/// Characters of raw form text returned when no explanation is generated.
pub const FORM_PREVIEW_CHARS: usize = 1200;

const FORM_TEMPERATURE: f32 = 0.2;
const FORM_MAX_TOKENS: u32 = 800;

const FORM_INSTRUCTIONS: &str = "You are a forms assistant. Given the form text below, list each \
field and explain:\n- What it means\n- What acceptable values look like\n- Any HR/EPF/ETF \
compliance notes\n\nReturn a concise, numbered list.\n\nFORM TEXT:\n";

/// Explain each field of `text`.
///
/// Without a generator, or when generation fails, returns the form text
/// itself, cut to [`FORM_PREVIEW_CHARS`] with a trailing `...` when longer.
pub async fn explain_form(text: &str, generator: Option<&Generator>) -> String {
    if let Some(generator) = generator {
        let prompt = format!("{}{}", FORM_INSTRUCTIONS, text);
        match generator
            .generate(vec![ChatMessage::user(prompt)], FORM_TEMPERATURE, FORM_MAX_TOKENS)
            .await
        {
            Synthesis::Generated(explanation) => return explanation,
            Synthesis::Unavailable(reason) => {
                tracing::warn!("Form explanation unavailable: {}", reason)
            }
        }
    }

    preview(text)
}

fn preview(text: &str) -> String {
    let head = truncate_chars(text, FORM_PREVIEW_CHARS);
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
