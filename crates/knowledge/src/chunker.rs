//! Fixed-window text chunking with overlap.
//!
//! Windows are measured in characters. Every chunk spans
//! `[start, min(start + chunk_size, len))`, the next chunk starts `overlap`
//! characters before the previous end, and the final chunk ends exactly at
//! the end of the text. Chunk text is never trimmed, so dropping the trailing
//! `overlap` characters of every chunk but the last and concatenating the
//! rest reproduces the document.

use crate::types::{Chunk, ChunkMetadata, Document};
use assistant_core::ChunkingConfig;

/// Character spans `(start, end)` covering a text of `len` characters.
pub fn chunk_spans(len: usize, chunk_size: usize, overlap: usize) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    if len == 0 || chunk_size == 0 {
        return spans;
    }

    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(len);
        spans.push((start, end));
        if end == len {
            break;
        }
        // Always advance, even for a degenerate overlap.
        start = end.saturating_sub(overlap).max(start + 1);
    }

    spans
}

/// Split a document into overlapping chunks tagged with provenance.
pub fn chunk_document(document: &Document, config: &ChunkingConfig) -> Vec<Chunk> {
    let text = &document.text;

    // Byte offset of every char boundary, including the end of the string.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    let chunks: Vec<Chunk> = chunk_spans(char_count, config.chunk_size, config.overlap)
        .into_iter()
        .enumerate()
        .map(|(position, (start, end))| Chunk {
            content: text[boundaries[start]..boundaries[end]].to_string(),
            metadata: ChunkMetadata::new(document.source_name.clone(), position as u32),
        })
        .collect();

    tracing::debug!(
        "Chunked '{}' into {} chunks (size: {}, overlap: {})",
        document.source_name,
        chunks.len(),
        config.chunk_size,
        config.overlap
    );

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(text: &str) -> Document {
        Document {
            source_name: "handbook".to_string(),
            text: text.to_string(),
        }
    }

    fn reconstruct(chunks: &[Chunk], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i + 1 == chunks.len() {
                out.push_str(&chunk.content);
            } else {
                let keep = chunk.content.chars().count() - overlap;
                out.extend(chunk.content.chars().take(keep));
            }
        }
        out
    }

    #[test]
    fn test_default_window_offsets() {
        assert_eq!(
            chunk_spans(2000, 800, 150),
            vec![(0, 800), (650, 1450), (1300, 2000)]
        );
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let doc = document("Short policy.");
        let chunks = chunk_document(&doc, &ChunkingConfig::default());

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Short policy.");
        assert_eq!(chunks[0].metadata.position, 0);
    }

    #[test]
    fn test_exact_window_is_single_chunk() {
        assert_eq!(chunk_spans(800, 800, 150), vec![(0, 800)]);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_document(&document(""), &ChunkingConfig::default()).is_empty());
    }

    #[test]
    fn test_last_chunk_ends_at_text_end() {
        let spans = chunk_spans(801, 800, 150);
        assert_eq!(spans, vec![(0, 800), (650, 801)]);
    }

    #[test]
    fn test_metadata() {
        let text = "x".repeat(2000);
        let chunks = chunk_document(&document(&text), &ChunkingConfig::default());

        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.source_name, "handbook");
            assert_eq!(chunk.metadata.raw_url, "/files/handbook.pdf");
            assert_eq!(chunk.metadata.position, i as u32);
        }
    }

    #[test]
    fn test_reconstruction() {
        let text: String = (0..2500)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect();
        let config = ChunkingConfig::default();
        let chunks = chunk_document(&document(&text), &config);

        assert_eq!(reconstruct(&chunks, config.overlap), text);
    }

    fn expected_chunk_count(len: usize, config: &ChunkingConfig) -> usize {
        let step = config.chunk_size - config.overlap;
        match len {
            0 => 0,
            n if n <= config.chunk_size => 1,
            n => 1 + (n - config.chunk_size).div_ceil(step),
        }
    }

    #[test]
    fn test_length_sweep_counts_and_reconstruction() {
        let config = ChunkingConfig::default();
        let alphabet: Vec<char> = "Leave policy: día 🌴 \n\t".chars().collect();
        let source: Vec<char> = (0..3000).map(|i| alphabet[i % alphabet.len()]).collect();

        for len in 0..3000 {
            let text: String = source[..len].iter().collect();
            let chunks = chunk_document(&document(&text), &config);

            assert_eq!(chunks.len(), expected_chunk_count(len, &config), "len {}", len);
            assert_eq!(reconstruct(&chunks, config.overlap), text, "len {}", len);
            for (i, chunk) in chunks.iter().enumerate() {
                assert_eq!(chunk.metadata.position, i as u32);
                assert!(chunk.content.chars().count() <= config.chunk_size);
            }
        }
    }

    #[test]
    fn test_reconstruction_with_whitespace_and_multibyte() {
        let text = "Política de férias 🌴\n\n   Dias úteis: 22.  \t".repeat(60);
        let config = ChunkingConfig {
            chunk_size: 97,
            overlap: 13,
        };
        let chunks = chunk_document(&document(&text), &config);

        assert!(chunks.len() > 1);
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.content.chars().count(), 97);
        }
        assert_eq!(reconstruct(&chunks, config.overlap), text);
    }

    #[test]
    fn test_no_overlap() {
        assert_eq!(chunk_spans(10, 5, 0), vec![(0, 5), (5, 10)]);
    }
}
