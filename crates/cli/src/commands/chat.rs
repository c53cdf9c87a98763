//! Chat command handler.
//!
//! Reads one question per line from stdin until EOF or `exit`, answering each
//! through a single shared engine.

use crate::commands::ask::{engine_handle, print_answer};
use assistant_core::config::AppConfig;
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Answer questions read line by line from stdin
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Number of passages to retrieve per question
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        let top_k = self.top_k.unwrap_or(config.top_k as usize);
        let handle = engine_handle(config);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("Ask a question (empty line skips, `exit` quits).");
        while let Some(line) = lines.next_line().await? {
            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if question == "exit" || question == "quit" {
                break;
            }

            match handle.answer_question(question, top_k).await {
                Ok(answer) => print_answer(&answer),
                // Not cached; the next question retries after an ingest.
                Err(e) if e.is_not_ingested() => println!("{}", e),
                Err(e) => return Err(e.into()),
            }
            println!();
        }

        Ok(())
    }
}
