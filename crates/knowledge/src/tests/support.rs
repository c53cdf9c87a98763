//! Test doubles.

use assistant_core::{AppError, AppResult};
use assistant_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Script {
    Reply(String),
    Fail,
    Slow(Duration),
}

/// An `LlmClient` that follows a fixed script and records requests.
#[derive(Debug)]
pub struct ScriptedClient {
    script: Script,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn reply(text: &str) -> Arc<Self> {
        Self::new(Script::Reply(text.to_string()))
    }

    pub fn failing() -> Arc<Self> {
        Self::new(Script::Fail)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Self::new(Script::Slow(delay))
    }

    pub fn last_request(&self) -> Option<LlmRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.script {
            Script::Reply(text) => Ok(LlmResponse {
                content: text.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(10, 5),
            }),
            Script::Fail => Err(AppError::Llm("connection refused".to_string())),
            Script::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Err(AppError::Llm("too slow".to_string()))
            }
        }
    }
}

/// Write `(name, text)` pairs as `.txt` files into `dir`.
pub fn write_corpus(dir: &Path, documents: &[(&str, &str)]) {
    fs::create_dir_all(dir).unwrap();
    for (name, text) in documents {
        fs::write(dir.join(format!("{}.txt", name)), text).unwrap();
    }
}
