pub mod pinecone;

pub use pinecone::PineconeStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// Metadata stored alongside each vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// The original chunk text.
    pub text: String,
    /// Source document filename.
    pub filename: String,
}

/// A record persisted in the external vector database.
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// One ranked match returned by a similarity query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    pub metadata: Option<ChunkMetadata>,
}

/// Boundary to the external vector database.
///
/// Ranking and tie-breaking are the store's business; callers treat the
/// returned order as final.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite records by id.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), ApiError>;

    /// Return the `top_k` most similar records for the query vector.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>, ApiError>;
}
