//! Ingestion: extracted text files to a persisted vector index.

use crate::chunker::chunk_document;
use crate::embeddings::{create_provider, embed_chunks, EmbeddingConfig, EmbeddingProvider};
use crate::index::SqliteVectorIndex;
use crate::types::{Chunk, Document, IngestOptions, IngestReport, SkippedDocument};
use assistant_core::{AppError, AppResult};
use std::fs;
use std::path::Path;
use std::time::Instant;
use walkdir::WalkDir;

/// Extension of extracted documents.
const DOCUMENT_EXTENSION: &str = "txt";

/// Build the vector store from every `.txt` file in `processed_dir`.
///
/// Uses the default chunk window. See [`build_vectorstore_with`].
pub async fn build_vectorstore(
    processed_dir: &Path,
    persist_dir: &Path,
    model_name: &str,
) -> AppResult<IngestReport> {
    build_vectorstore_with(&IngestOptions::new(processed_dir, persist_dir).with_model(model_name))
        .await
}

/// Build the vector store.
///
/// Both directories are created if missing. Files that cannot be read are
/// skipped with a warning. When no document yields a chunk the run is a no-op
/// and any existing index is left as it was. Embedding and index failures are
/// fatal, and the previous index stays in place.
pub async fn build_vectorstore_with(options: &IngestOptions) -> AppResult<IngestReport> {
    options.chunking.validate()?;
    let embedding = EmbeddingConfig::for_model(&options.model_name)?;
    let provider = create_provider(&embedding)?;

    ingest_with_provider(options, &embedding, provider.as_ref()).await
}

pub(crate) async fn ingest_with_provider(
    options: &IngestOptions,
    embedding: &EmbeddingConfig,
    provider: &dyn EmbeddingProvider,
) -> AppResult<IngestReport> {
    let start_time = Instant::now();

    for dir in [&options.processed_dir, &options.persist_dir] {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Knowledge(format!("Failed to create {}: {}", dir.display(), e))
        })?;
    }

    let (documents, skipped) = read_documents(&options.processed_dir)?;
    let empty_documents = documents.iter().filter(|d| d.text.is_empty()).count() as u32;

    let chunks: Vec<Chunk> = documents
        .iter()
        .filter(|d| !d.text.is_empty())
        .flat_map(|d| chunk_document(d, &options.chunking))
        .collect();

    let mut report = IngestReport {
        documents: documents.len() as u32 - empty_documents,
        chunks: chunks.len() as u32,
        empty_documents,
        skipped,
        index_written: false,
        duration_secs: 0.0,
    };

    if chunks.is_empty() {
        tracing::info!(
            "No documents to ingest in {}, leaving index unchanged",
            options.processed_dir.display()
        );
        report.duration_secs = start_time.elapsed().as_secs_f64();
        return Ok(report);
    }

    tracing::info!(
        "Ingesting {} chunks from {} documents",
        report.chunks,
        report.documents
    );

    let embeddings = embed_chunks(provider, &chunks).await?;
    SqliteVectorIndex::build(&options.persist_dir, embedding, &chunks, &embeddings)?;

    report.index_written = true;
    report.duration_secs = start_time.elapsed().as_secs_f64();

    tracing::info!(
        "Ingestion complete: {} documents, {} chunks in {:.2}s",
        report.documents,
        report.chunks,
        report.duration_secs
    );

    Ok(report)
}

/// Read the `.txt` files directly inside `dir`, sorted by file name.
///
/// Text is decoded leniently and stripped of surrounding whitespace; empty
/// documents are returned with empty text so the caller can count them.
pub fn read_documents(dir: &Path) -> AppResult<(Vec<Document>, Vec<SkippedDocument>)> {
    let mut documents = Vec::new();
    let mut skipped = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                if let Some(path) = e.path() {
                    skipped.push(SkippedDocument {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    });
                }
                continue;
            }
        };

        let path = entry.path();
        let is_document = path.extension().and_then(|e| e.to_str()) == Some(DOCUMENT_EXTENSION);
        if !entry.file_type().is_file() || !is_document {
            continue;
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                skipped.push(SkippedDocument {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let source_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = String::from_utf8_lossy(&bytes).trim().to_string();

        if text.is_empty() {
            tracing::debug!("Skipping empty document {}", path.display());
        }

        documents.push(Document { source_name, text });
    }

    Ok((documents, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_documents_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.txt"), "  second  \n").unwrap();
        fs::write(temp.path().join("a.txt"), "first").unwrap();
        fs::write(temp.path().join("notes.md"), "ignored").unwrap();
        fs::write(temp.path().join("blank.txt"), " \n\t").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested").join("deep.txt"), "ignored").unwrap();

        let (documents, skipped) = read_documents(temp.path()).unwrap();
        assert!(skipped.is_empty());

        let names: Vec<&str> = documents.iter().map(|d| d.source_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "blank"]);
        assert_eq!(documents[1].text, "second");
        assert!(documents[2].text.is_empty());
    }

    #[test]
    fn test_read_documents_decodes_leniently() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("latin1.txt"), b"caf\xe9 menu").unwrap();

        let (documents, _) = read_documents(temp.path()).unwrap();
        assert_eq!(documents[0].text, "caf\u{FFFD} menu");
    }

    #[tokio::test]
    async fn test_creates_missing_directories() {
        let temp = TempDir::new().unwrap();
        let processed = temp.path().join("processed");
        let persist = temp.path().join("vectorstore");

        let report = build_vectorstore(&processed, &persist, "trigram-v1")
            .await
            .unwrap();

        assert!(processed.is_dir());
        assert!(persist.is_dir());
        assert_eq!(report.chunks, 0);
        assert!(!report.index_written);
    }

    #[tokio::test]
    async fn test_unknown_model_is_rejected() {
        let temp = TempDir::new().unwrap();
        let result = build_vectorstore(temp.path(), temp.path(), "word2vec").await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
