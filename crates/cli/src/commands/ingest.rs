//! Ingest command handler.

use anyhow::Context;
use assistant_core::config::AppConfig;
use assistant_knowledge::{build_vectorstore_with, IngestOptions};
use clap::Args;
use std::path::PathBuf;

/// Build the vector index from processed documents
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Directory of extracted .txt documents
    #[arg(long)]
    pub processed: Option<PathBuf>,

    /// Directory to write the index to
    #[arg(long)]
    pub vectorstore: Option<PathBuf>,

    /// Embedding model (trigram-v1, ollama:<model>[@<dims>])
    #[arg(long)]
    pub model: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        let options = IngestOptions::new(
            self.processed.clone().unwrap_or_else(|| config.processed_dir()),
            self.vectorstore.clone().unwrap_or_else(|| config.vectorstore_dir()),
        )
        .with_model(
            self.model
                .clone()
                .unwrap_or_else(|| config.embedding_model.clone()),
        )
        .with_chunking(config.chunking);

        tracing::info!(
            "Ingesting {} into {}",
            options.processed_dir.display(),
            options.persist_dir.display()
        );

        let report = build_vectorstore_with(&options)
            .await
            .context("Ingestion failed")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        if report.index_written {
            println!(
                "Indexed {} documents ({} chunks) in {:.2}s",
                report.documents, report.chunks, report.duration_secs
            );
        } else {
            println!(
                "No documents found in {}; index left unchanged",
                options.processed_dir.display()
            );
        }
        if report.empty_documents > 0 {
            println!("Skipped {} empty documents", report.empty_documents);
        }
        for skipped in &report.skipped {
            println!("Skipped {}: {}", skipped.path.display(), skipped.reason);
        }

        Ok(())
    }
}
