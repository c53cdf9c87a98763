//! Forms command handler.

use anyhow::Context;
use assistant_core::config::AppConfig;
use assistant_knowledge::{explain_form, Generator};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Form assistance
#[derive(Args, Debug)]
pub struct FormsCommand {
    #[command(subcommand)]
    pub action: FormsAction,
}

#[derive(Subcommand, Debug)]
pub enum FormsAction {
    /// Explain each field of an extracted form
    Explain(FormsExplainCommand),
}

/// Explain each field of an extracted form
#[derive(Args, Debug)]
pub struct FormsExplainCommand {
    /// Text file holding the extracted form
    pub file: PathBuf,
}

impl FormsExplainCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        let bytes = std::fs::read(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let text = String::from_utf8_lossy(&bytes);

        let generator = Generator::from_config(&config.generation)?;
        let explanation = explain_form(&text, generator.as_ref()).await;

        println!("{}", explanation);
        Ok(())
    }
}

impl FormsCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        match &self.action {
            FormsAction::Explain(cmd) => cmd.execute(config).await,
        }
    }
}
