//! Azure OpenAI chat-completions provider.
//!
//! Requests go to a deployment-scoped URL:
//! `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={version}`
//! and authenticate with the `api-key` header.

use crate::client::{ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmUsage};
use assistant_core::{AppError, AppResult, GenerationConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<LlmUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Azure OpenAI chat client bound to one endpoint and key.
pub struct AzureOpenAiClient {
    endpoint: String,
    api_key: String,
    api_version: String,
    client: reqwest::Client,
}

impl AzureOpenAiClient {
    /// Create a client from generation settings.
    pub fn from_config(config: &GenerationConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            client,
        })
    }

    /// Deployment-scoped completions URL.
    fn completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, deployment, self.api_version
        )
    }

    fn convert_response(response: ChatCompletionResponse) -> AppResult<LlmResponse> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| AppError::Llm("Azure OpenAI response has no content".to_string()))?;

        Ok(LlmResponse {
            content,
            model: response.model,
            usage: response.usage.unwrap_or_default(),
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for AzureOpenAiClient {
    fn provider_name(&self) -> &str {
        "azure"
    }

    #[tracing::instrument(skip(self, request), fields(deployment = %request.model))]
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!("Sending chat completion request to Azure OpenAI");

        let body = ChatCompletionRequest {
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.completions_url(&request.model))
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Azure OpenAI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Azure OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Azure OpenAI response: {}", e)))?;

        tracing::debug!("Received completion from Azure OpenAI");
        Self::convert_response(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GenerationConfig {
        GenerationConfig {
            endpoint: "https://contoso.openai.azure.com/".to_string(),
            api_key: "key".to_string(),
            model_id: "gpt-4o-mini".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_completions_url() {
        let client = AzureOpenAiClient::from_config(&config()).unwrap();
        assert_eq!(
            client.completions_url("gpt-4o-mini"),
            "https://contoso.openai.azure.com/openai/deployments/gpt-4o-mini/chat/completions?api-version=2024-02-15-preview"
        );
    }

    #[test]
    fn test_convert_response_with_content() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"model":"gpt-4o-mini","choices":[{"message":{"role":"assistant","content":"Leave is 14 days [1]."}}],"usage":{"prompt_tokens":100,"completion_tokens":8,"total_tokens":108}}"#,
        )
        .unwrap();

        let converted = AzureOpenAiClient::convert_response(response).unwrap();
        assert_eq!(converted.content, "Leave is 14 days [1].");
        assert_eq!(converted.usage.total_tokens, 108);
    }

    #[test]
    fn test_convert_response_null_content_is_error() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        )
        .unwrap();
        assert!(AzureOpenAiClient::convert_response(response).is_err());
    }

    #[test]
    fn test_convert_response_no_choices_is_error() {
        let response: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(AzureOpenAiClient::convert_response(response).is_err());
    }
}
