use std::sync::Arc;

use crate::core::errors::ApiError;
use crate::embedding::EmbeddingClient;
use crate::vector::VectorStore;

/// Embeds a query and fetches the most similar chunks from the store.
///
/// Match order is whatever the store returns; no local re-ranking and no
/// similarity threshold.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingClient>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        store: Arc<dyn VectorStore>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Returns the context block for a query: matched chunk texts joined
    /// by blank lines. No matches yields an empty string, which is not an
    /// error.
    pub async fn search(&self, query: &str) -> Result<String, ApiError> {
        let embedding = self.embedder.embed(query).await?;
        let matches = self.store.query(&embedding, self.top_k).await?;

        let texts: Vec<&str> = matches
            .iter()
            .filter_map(|m| m.metadata.as_ref().map(|md| md.text.as_str()))
            .collect();

        Ok(texts.join("\n\n"))
    }
}
