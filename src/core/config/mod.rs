pub mod defaults;
pub mod validation;

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::types::ChatMessage;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level service configuration.
///
/// Loaded from `config.yml` (path overridable via `NEWSDESK_CONFIG_PATH`),
/// then overridden by environment variables for secrets and deployment
/// knobs. Every section has serde defaults, so an absent or empty file is
/// a valid starting point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub vector_store: VectorStoreConfig,
    pub rag: RagConfig,
    pub http: HttpConfig,
    pub persona: PersonaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Model name echoed back when the caller omits `model`.
    pub default_model: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: Vec::new(),
            default_model: "gpt-3.5-turbo".to_string(),
            log_dir: None,
        }
    }
}

/// Upstream OpenAI-compatible chat-completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    /// The model actually used for generation, independent of the
    /// caller-supplied `model` field.
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
        }
    }
}

/// External embedding service, OpenAI-compatible `/embeddings` shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "text-embedding-3-small".to_string(),
        }
    }
}

/// External vector database, addressed by its index data-plane host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    /// Index host URL, e.g. `https://my-index-abc123.svc.us-east-1.pinecone.io`.
    pub endpoint: String,
    pub api_key: String,
    pub namespace: Option<String>,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            namespace: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Number of matches requested per retrieval.
    pub top_k: usize,
    /// Chunk size in whitespace-delimited words.
    pub chunk_size: usize,
    /// Directory scanned by the indexer for `*.txt` documents.
    pub source_dir: PathBuf,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            chunk_size: 500,
            source_dir: PathBuf::from("source_text"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout applied to every outbound remote call.
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
        }
    }
}

/// The fixed persona prepended to every upstream conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    pub system_prompt: String,
    /// Exemplar exchanges inserted between the system prompt and the
    /// caller's conversation.
    pub few_shot: Vec<ChatMessage>,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            system_prompt: defaults::default_system_prompt(),
            few_shot: defaults::default_few_shot(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> PathBuf {
        env::var("NEWSDESK_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.yml"))
    }

    /// Loads the config file if present, applies environment overrides and
    /// validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            serde_yaml::from_str(&contents)
                .map_err(|source| ConfigError::Parse { path, source })?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok());
        validation::validate(&config)?;
        Ok(config)
    }

    /// Applies overrides from a key lookup. The environment variable names
    /// match what the deployment scripts already export.
    pub fn apply_overrides<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = get("OPENAI_API_KEY") {
            self.llm.api_key = val;
        }
        if let Some(val) = get("OPENAI_BASE_URL") {
            self.llm.base_url = val;
        }
        if let Some(val) = get("OPENAI_MODEL") {
            self.llm.model = val;
        }
        if let Some(val) = get("EMBEDDING_API_KEY") {
            self.embedding.api_key = val;
        }
        if let Some(val) = get("EMBEDDING_BASE_URL") {
            self.embedding.base_url = val;
        }
        if let Some(val) = get("EMBEDDING_MODEL") {
            self.embedding.model = val;
        }
        if let Some(val) = get("PINECONE_API_KEY") {
            self.vector_store.api_key = val;
        }
        if let Some(val) = get("PINECONE_INDEX_HOST") {
            self.vector_store.endpoint = val;
        }
        if let Some(val) = get("PINECONE_NAMESPACE") {
            self.vector_store.namespace = Some(val);
        }
        if let Some(val) = get("PORT") {
            if let Ok(port) = val.parse::<u16>() {
                self.server.port = port;
            }
        }
    }
}
