//! Generation capability for the Employee Assistant.
//!
//! This crate provides a provider-agnostic abstraction over chat-completion
//! backends. Callers build an [`LlmRequest`] from chat messages and send it
//! through any [`LlmClient`].
//!
//! # Providers
//! - **Azure OpenAI**: deployment-scoped chat completions (default)
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use assistant_llm::{ChatMessage, LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new(vec![ChatMessage::user("Hello, world!")], "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{ChatMessage, ChatRole, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{AzureOpenAiClient, OllamaClient};
pub use types::ProviderType;
