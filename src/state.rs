use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::core::config::AppConfig;
use crate::embedding::{EmbeddingClient, OpenAiEmbedder};
use crate::llm::{LlmProvider, OpenAiProvider};
use crate::rag::Retriever;
use crate::vector::{PineconeStore, VectorStore};

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Shared application state: configuration plus the boundary clients,
/// built once from explicit config and injected everywhere.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub llm: Arc<dyn LlmProvider>,
    pub retriever: Retriever,
}

impl AppState {
    pub fn initialize(config: AppConfig) -> Result<Arc<Self>, InitializationError> {
        let timeout = Duration::from_secs(config.http.request_timeout_secs);

        let llm = Arc::new(OpenAiProvider::new(
            &config.llm.base_url,
            &config.llm.api_key,
            timeout,
        )?);

        let embedder: Arc<dyn EmbeddingClient> = Arc::new(OpenAiEmbedder::new(
            &config.embedding.base_url,
            &config.embedding.api_key,
            &config.embedding.model,
            timeout,
        )?);

        let store: Arc<dyn VectorStore> = Arc::new(PineconeStore::new(
            &config.vector_store.endpoint,
            &config.vector_store.api_key,
            config.vector_store.namespace.clone(),
            timeout,
        )?);

        let retriever = Retriever::new(embedder, store, config.rag.top_k);

        Ok(Arc::new(Self {
            config,
            llm,
            retriever,
        }))
    }

    /// Assemble a state from explicit components.
    pub fn with_components(
        config: AppConfig,
        llm: Arc<dyn LlmProvider>,
        retriever: Retriever,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            llm,
            retriever,
        })
    }
}
