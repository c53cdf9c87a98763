//! Stats command handler.

use anyhow::Context;
use assistant_core::config::AppConfig;
use clap::Args;

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the N most frequently asked questions instead
    #[arg(long, value_name = "N")]
    pub top_queries: Option<usize>,
}

impl StatsCommand {
    pub fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        if let Some(limit) = self.top_queries {
            return self.print_top_queries(config, limit);
        }

        let stats = assistant_knowledge::stats(&config.vectorstore_dir())
            .context("Failed to read index")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        println!("Index: {}", stats.persist_dir.display());
        println!("  Documents: {}", stats.documents_count);
        println!("  Chunks: {}", stats.chunks_count);
        println!("  DB size: {} bytes", stats.db_size_bytes);
        if let (Some(model), Some(dimensions)) = (&stats.model, stats.dimensions) {
            println!("  Model: {} ({} dims)", model, dimensions);
        }
        if let Some(built_at) = stats.built_at {
            println!("  Built: {}", built_at);
        }

        Ok(())
    }

    fn print_top_queries(&self, config: &AppConfig, limit: usize) -> anyhow::Result<()> {
        let path = config.analytics_file();
        let top = assistant_knowledge::top_queries(&path, limit)
            .with_context(|| format!("Failed to read analytics from {}", path.display()))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&top)?);
            return Ok(());
        }

        if top.is_empty() {
            println!("No questions recorded yet.");
            return Ok(());
        }

        println!("Top queries:");
        for (i, entry) in top.iter().enumerate() {
            println!("  {:>3}. {} ({})", i + 1, entry.question, entry.count);
        }

        Ok(())
    }
}
