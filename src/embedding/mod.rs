pub mod openai;

pub use openai::OpenAiEmbedder;

use async_trait::async_trait;

use crate::core::errors::ApiError;

/// Boundary to the external embedding service.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce the embedding vector for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError>;
}
