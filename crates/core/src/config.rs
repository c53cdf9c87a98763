//! Configuration management for the Employee Assistant.
//!
//! This module handles loading and merging configuration from multiple sources,
//! lowest precedence first:
//! - Built-in defaults
//! - Config file (`assistant.yaml` in the workspace, or `ASSISTANT_CONFIG`)
//! - `.env` in the workspace, then the process environment
//! - Command-line flags
//!
//! Relative paths are resolved against the workspace root.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default chunk window length, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 800;

/// Default span repeated between consecutive chunks, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: u32 = 4;

/// Default embedding model identifier (offline trigram embedder).
pub const DEFAULT_EMBEDDING_MODEL: &str = "trigram-v1";

/// Default Azure OpenAI REST API version.
pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

const CONFIG_FILE_NAME: &str = "assistant.yaml";
const ANALYTICS_FILE_NAME: &str = "analytics.jsonl";

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path to the workspace root
    pub workspace: PathBuf,

    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Directory of extracted plain-text documents (unresolved)
    processed_dir: Option<PathBuf>,

    /// Directory holding the persisted vector index (unresolved)
    vectorstore_dir: Option<PathBuf>,

    /// Embedding model identifier used at ingestion time
    pub embedding_model: String,

    /// Default number of chunks to retrieve
    pub top_k: u32,

    /// Chunk window settings
    pub chunking: ChunkingConfig,

    /// Generation backend settings
    pub generation: GenerationConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,
}

/// Chunk window configuration.
///
/// `chunk_size` is the window length and `overlap` the span repeated between
/// consecutive chunks of the same document, both counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub overlap: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    /// Check that the window always advances.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config("chunk_size must be positive".to_string()));
        }
        if self.overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Generation backend configuration.
///
/// The backend counts as configured only when every field its provider needs
/// is non-empty. Partial configuration is not an error.
#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Provider name: "azure" or "ollama"
    pub provider: String,

    /// Base endpoint URL
    pub endpoint: String,

    /// API key (environment only, never written back)
    #[serde(skip)]
    pub api_key: String,

    /// Model or deployment identifier
    pub model_id: String,

    /// REST API version (Azure)
    pub api_version: String,

    /// Upper bound for one generation request
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "azure".to_string(),
            endpoint: String::new(),
            api_key: String::new(),
            model_id: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("model_id", &self.model_id)
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GenerationConfig {
    /// Whether enough is set to issue requests.
    pub fn is_configured(&self) -> bool {
        let endpoint = !self.endpoint.trim().is_empty();
        let model = !self.model_id.trim().is_empty();
        match self.provider.to_lowercase().as_str() {
            "ollama" => endpoint && model,
            _ => endpoint && model && !self.api_key.trim().is_empty(),
        }
    }

    /// Overlay environment variables onto this configuration.
    fn apply_env(&mut self, env: &dyn Fn(&str) -> Option<String>) {
        if let Some(provider) = env("ASSISTANT_LLM_PROVIDER") {
            self.provider = provider;
        }
        if self.provider.eq_ignore_ascii_case("ollama") {
            if let Some(url) = env("OLLAMA_URL") {
                self.endpoint = url;
            }
            if let Some(model) = env("OLLAMA_MODEL") {
                self.model_id = model;
            }
            return;
        }
        if let Some(endpoint) = env("AZURE_OPENAI_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(key) = env("AZURE_OPENAI_KEY") {
            self.api_key = key;
        }
        if let Some(deployment) = env("AZURE_OPENAI_DEPLOYMENT") {
            self.model_id = deployment;
        }
        if let Some(version) = env("AZURE_OPENAI_API_VERSION") {
            self.api_version = version;
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    paths: Option<PathsSection>,
    embedding: Option<EmbeddingSection>,
    retrieval: Option<RetrievalSection>,
    chunking: Option<ChunkingConfig>,
    generation: Option<GenerationSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct PathsSection {
    processed: Option<PathBuf>,
    vectorstore: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingSection {
    model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RetrievalSection {
    top_k: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerationSection {
    provider: Option<String>,
    endpoint: Option<String>,
    deployment: Option<String>,
    api_version: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            processed_dir: None,
            vectorstore_dir: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            top_k: DEFAULT_TOP_K,
            chunking: ChunkingConfig::default(),
            generation: GenerationConfig::default(),
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment and defaults.
    ///
    /// `workspace` and `config_file` come from CLI flags when given and fall
    /// back to `ASSISTANT_WORKSPACE` / `ASSISTANT_CONFIG`. A `.env` file in the
    /// workspace is loaded first; variables already set in the process win.
    ///
    /// # Example
    /// ```no_run
    /// use assistant_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Vectorstore: {:?}", config.vectorstore_dir());
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let workspace = workspace
            .or_else(|| std::env::var("ASSISTANT_WORKSPACE").ok().map(PathBuf::from))
            .unwrap_or_else(|| AppConfig::default().workspace);

        let dotenv_path = workspace.join(".env");
        match dotenvy::from_path(&dotenv_path) {
            Ok(()) => tracing::debug!("Loaded environment from {:?}", dotenv_path),
            Err(e) if e.not_found() => {}
            Err(e) => {
                return Err(AppError::Config(format!(
                    "Failed to load {:?}: {}",
                    dotenv_path, e
                )))
            }
        }

        Self::load_with(workspace, config_file, &|key| std::env::var(key).ok())
    }

    /// Load configuration with an explicit environment lookup.
    pub fn load_with(
        workspace: PathBuf,
        config_file: Option<PathBuf>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        if !workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                workspace
            )));
        }

        let mut config = Self {
            workspace,
            ..Self::default()
        };

        let explicit = config_file.or_else(|| env("ASSISTANT_CONFIG").map(PathBuf::from));
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Some(path)
            }
            None => {
                let default_path = config.workspace.join(CONFIG_FILE_NAME);
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(path) = config_path {
            config.merge_yaml(&path)?;
        }

        // Environment variables override the YAML config
        if let Some(dir) = env("ASSISTANT_PROCESSED_DIR") {
            config.processed_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = env("ASSISTANT_VECTORSTORE_DIR") {
            config.vectorstore_dir = Some(PathBuf::from(dir));
        }
        if let Some(model) = env("ASSISTANT_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        config.generation.apply_env(env);

        if config.log_level.is_none() {
            config.log_level = env("RUST_LOG");
        }
        if env("NO_COLOR").is_some() {
            config.no_color = true;
        }

        config.chunking.validate()?;
        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &Path) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(paths) = file.paths {
            if paths.processed.is_some() {
                self.processed_dir = paths.processed;
            }
            if paths.vectorstore.is_some() {
                self.vectorstore_dir = paths.vectorstore;
            }
        }

        if let Some(model) = file.embedding.and_then(|e| e.model) {
            self.embedding_model = model;
        }

        if let Some(top_k) = file.retrieval.and_then(|r| r.top_k) {
            self.top_k = top_k;
        }

        if let Some(chunking) = file.chunking {
            self.chunking = chunking;
        }

        if let Some(generation) = file.generation {
            if let Some(provider) = generation.provider {
                self.generation.provider = provider;
            }
            if let Some(endpoint) = generation.endpoint {
                self.generation.endpoint = endpoint;
            }
            if let Some(deployment) = generation.deployment {
                self.generation.model_id = deployment;
            }
            if let Some(version) = generation.api_version {
                self.generation.api_version = version;
            }
            if let Some(timeout) = generation.timeout_secs {
                self.generation.timeout_secs = timeout;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
            if let Some(json) = logging.json {
                self.log_json = json;
            }
        }

        self.config_file = Some(path.to_path_buf());
        tracing::debug!("Merged config file {:?}", path);
        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        log_json: bool,
    ) -> Self {
        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if log_json {
            self.log_json = true;
        }

        self
    }

    /// Directory of processed plain-text documents.
    pub fn processed_dir(&self) -> PathBuf {
        self.resolve(self.processed_dir.as_deref(), "data/processed")
    }

    /// Directory of the persisted vector index.
    pub fn vectorstore_dir(&self) -> PathBuf {
        self.resolve(self.vectorstore_dir.as_deref(), "data/vectorstore")
    }

    /// Append-only log of answered questions.
    pub fn analytics_file(&self) -> PathBuf {
        self.workspace.join("data").join(ANALYTICS_FILE_NAME)
    }

    fn resolve(&self, configured: Option<&Path>, default: &str) -> PathBuf {
        match configured {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.workspace.join(path),
            None => self.workspace.join(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.top_k, 4);
        assert_eq!(config.embedding_model, "trigram-v1");
        assert_eq!(config.chunking.chunk_size, 800);
        assert_eq!(config.chunking.overlap, 150);
        assert!(!config.generation.is_configured());
    }

    #[test]
    fn test_default_paths_follow_workspace() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load_with(temp.path().to_path_buf(), None, &env_from(&[])).unwrap();
        assert_eq!(config.processed_dir(), temp.path().join("data/processed"));
        assert_eq!(config.vectorstore_dir(), temp.path().join("data/vectorstore"));
        assert_eq!(config.analytics_file(), temp.path().join("data/analytics.jsonl"));
    }

    #[test]
    fn test_missing_workspace_is_error() {
        let result = AppConfig::load_with(
            PathBuf::from("/definitely/not/a/workspace"),
            None,
            &env_from(&[]),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_yaml_then_env_precedence() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("assistant.yaml"),
            r#"
paths:
  processed: corpus/text
  vectorstore: /var/lib/assistant/index
embedding:
  model: ollama:all-minilm
retrieval:
  top_k: 6
chunking:
  chunk_size: 500
  overlap: 50
generation:
  endpoint: https://from-file.openai.azure.com
  deployment: gpt-file
logging:
  level: warn
  color: false
"#,
        )
        .unwrap();

        let env = env_from(&[
            ("AZURE_OPENAI_DEPLOYMENT", "gpt-env"),
            ("AZURE_OPENAI_KEY", "secret"),
        ]);
        let config = AppConfig::load_with(temp.path().to_path_buf(), None, &env).unwrap();

        assert_eq!(config.processed_dir(), temp.path().join("corpus/text"));
        assert_eq!(
            config.vectorstore_dir(),
            PathBuf::from("/var/lib/assistant/index")
        );
        assert_eq!(config.embedding_model, "ollama:all-minilm");
        assert_eq!(config.top_k, 6);
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.overlap, 50);
        assert_eq!(config.generation.endpoint, "https://from-file.openai.azure.com");
        assert_eq!(config.generation.model_id, "gpt-env");
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert!(config.no_color);
        assert!(config.generation.is_configured());
        assert!(config.config_file.is_some());
    }

    #[test]
    fn test_invalid_chunking_rejected() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("assistant.yaml"),
            "chunking:\n  chunk_size: 100\n  overlap: 100\n",
        )
        .unwrap();

        let result = AppConfig::load_with(temp.path().to_path_buf(), None, &env_from(&[]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_partial_generation_config_is_not_configured() {
        let mut generation = GenerationConfig {
            endpoint: "https://example.openai.azure.com".to_string(),
            model_id: "gpt-4o".to_string(),
            ..Default::default()
        };
        assert!(!generation.is_configured());

        generation.api_key = "key".to_string();
        assert!(generation.is_configured());

        generation.model_id = "   ".to_string();
        assert!(!generation.is_configured());
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let generation = GenerationConfig {
            provider: "ollama".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            model_id: "llama3.2".to_string(),
            ..Default::default()
        };
        assert!(generation.is_configured());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let generation = GenerationConfig {
            api_key: "super-secret".to_string(),
            ..Default::default()
        };
        let rendered = format!("{:?}", generation);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(None, true, true, true);
        assert!(config.verbose);
        assert!(config.no_color);
        assert!(config.log_json);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }
}
