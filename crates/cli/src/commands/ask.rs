//! Ask command handler.

use anyhow::Context;
use assistant_core::config::AppConfig;
use assistant_knowledge::{EngineHandle, JsonlSink, RagAnswer};
use clap::Args;
use std::sync::Arc;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to answer
    pub question: String,

    /// Number of passages to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        let top_k = self.top_k.unwrap_or(config.top_k as usize);
        let handle = engine_handle(config);

        let answer = handle
            .answer_question(&self.question, top_k)
            .await
            .context("Failed to answer question")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        } else {
            print_answer(&answer);
        }

        Ok(())
    }
}

/// Engine handle over the configured index, reporting to the log.
pub(crate) fn engine_handle(config: &AppConfig) -> EngineHandle {
    EngineHandle::new(config.vectorstore_dir(), config.generation.clone())
        .with_sink(Arc::new(JsonlSink::new(config.analytics_file())))
}

pub(crate) fn print_answer(answer: &RagAnswer) {
    println!("Answer:");
    println!("{}", answer.answer);
    println!();

    if answer.sources.is_empty() {
        println!("Sources: (no sources available)");
        return;
    }

    println!("Sources:");
    for source in &answer.sources {
        println!(
            "[{}] {} (part {}) {}",
            source.index,
            source.metadata.source_name,
            source.metadata.position + 1,
            source.metadata.raw_url
        );
    }
}
