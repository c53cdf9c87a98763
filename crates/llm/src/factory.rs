//! LLM provider factory.
//!
//! This module creates the configured generation client, or reports that no
//! backend is configured.

use crate::client::LlmClient;
use crate::providers::{AzureOpenAiClient, OllamaClient};
use crate::types::ProviderType;
use assistant_core::{AppError, AppResult, GenerationConfig};
use std::sync::Arc;
use std::time::Duration;

/// Create a generation client from configuration.
///
/// Returns `Ok(None)` when the backend is not configured: a missing endpoint,
/// key, or model identifier means "no generation", not a failure.
///
/// # Errors
/// Returns error if:
/// - Provider is unknown
/// - The HTTP client cannot be built
pub fn create_client(config: &GenerationConfig) -> AppResult<Option<Arc<dyn LlmClient>>> {
    let provider = ProviderType::parse(&config.provider).ok_or_else(|| {
        AppError::Config(format!(
            "Unknown generation provider: '{}'. Supported: azure, ollama",
            config.provider
        ))
    })?;

    if !config.is_configured() {
        tracing::debug!(
            "Generation provider '{}' is not fully configured; answers will be extractive",
            provider.as_str()
        );
        return Ok(None);
    }

    let client: Arc<dyn LlmClient> = match provider {
        ProviderType::AzureOpenAi => Arc::new(AzureOpenAiClient::from_config(config)?),
        ProviderType::Ollama => Arc::new(OllamaClient::with_timeout(
            config.endpoint.as_str(),
            Duration::from_secs(config.timeout_secs),
        )?),
    };

    tracing::debug!("Created generation client for provider '{}'", provider.as_str());
    Ok(Some(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_azure_yields_none() {
        let config = GenerationConfig::default();
        assert!(create_client(&config).unwrap().is_none());
    }

    #[test]
    fn test_configured_azure_client() {
        let config = GenerationConfig {
            endpoint: "https://contoso.openai.azure.com".to_string(),
            api_key: "key".to_string(),
            model_id: "gpt-4o-mini".to_string(),
            ..Default::default()
        };
        let client = create_client(&config).unwrap().unwrap();
        assert_eq!(client.provider_name(), "azure");
    }

    #[test]
    fn test_configured_ollama_client() {
        let config = GenerationConfig {
            provider: "ollama".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            model_id: "llama3.2".to_string(),
            ..Default::default()
        };
        let client = create_client(&config).unwrap().unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_unknown_provider() {
        let config = GenerationConfig {
            provider: "unknown".to_string(),
            ..Default::default()
        };
        match create_client(&config) {
            Err(err) => assert!(err.to_string().contains("Unknown generation provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
