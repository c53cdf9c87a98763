//! Command handlers for the assistant CLI.

pub mod ask;
pub mod chat;
pub mod forms;
pub mod ingest;
pub mod stats;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use forms::FormsCommand;
pub use ingest::IngestCommand;
pub use stats::StatsCommand;
