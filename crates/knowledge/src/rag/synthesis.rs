//! Calls to the generation backend, with failures captured as values.

use assistant_core::{AppResult, GenerationConfig};
use assistant_llm::{create_client, ChatMessage, LlmClient, LlmRequest};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default bound on one generation request.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a synthesis attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Synthesis {
    /// Non-empty text from the backend
    Generated(String),
    /// No usable text; the caller falls back
    Unavailable(SynthesisFailure),
}

/// Why synthesis produced nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisFailure {
    /// No backend configured
    NotConfigured,
    /// Nothing was retrieved to ground an answer in
    NoContext,
    /// The backend call failed (network, status, malformed body)
    Backend(String),
    /// The backend answered with blank text
    EmptyResponse,
    /// The backend did not answer in time
    TimedOut(Duration),
}

impl fmt::Display for SynthesisFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisFailure::NotConfigured => write!(f, "no generation backend configured"),
            SynthesisFailure::NoContext => write!(f, "no context retrieved"),
            SynthesisFailure::Backend(e) => write!(f, "backend error: {}", e),
            SynthesisFailure::EmptyResponse => write!(f, "backend returned an empty response"),
            SynthesisFailure::TimedOut(d) => write!(f, "backend timed out after {:?}", d),
        }
    }
}

/// A configured generation backend.
#[derive(Clone)]
pub struct Generator {
    client: Arc<dyn LlmClient>,
    model: String,
    timeout: Duration,
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("provider", &self.client.provider_name())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Generator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from configuration; `Ok(None)` when the backend is not fully configured.
    pub fn from_config(config: &GenerationConfig) -> AppResult<Option<Self>> {
        Ok(create_client(config)?.map(|client| {
            Self::new(client, config.model_id.clone())
                .with_timeout(Duration::from_secs(config.timeout_secs))
        }))
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one request. Never fails: every error becomes [`Synthesis::Unavailable`].
    pub async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> Synthesis {
        let request = LlmRequest::new(messages, self.model.clone())
            .with_temperature(temperature)
            .with_max_tokens(max_tokens);

        match tokio::time::timeout(self.timeout, self.client.complete(&request)).await {
            Err(_) => Synthesis::Unavailable(SynthesisFailure::TimedOut(self.timeout)),
            Ok(Err(e)) => Synthesis::Unavailable(SynthesisFailure::Backend(e.to_string())),
            Ok(Ok(response)) => {
                let text = response.content.trim();
                if text.is_empty() {
                    Synthesis::Unavailable(SynthesisFailure::EmptyResponse)
                } else {
                    Synthesis::Generated(text.to_string())
                }
            }
        }
    }
}
