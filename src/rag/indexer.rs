//! Offline document indexing: chunk, embed, upsert.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::chunker::word_chunks;
use crate::core::errors::ApiError;
use crate::embedding::EmbeddingClient;
use crate::vector::{ChunkMetadata, VectorRecord, VectorStore};

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexSummary {
    pub documents: usize,
    pub chunks: usize,
}

/// Populates the vector store from a directory of text documents.
///
/// Record ids are deterministic (`{filename}_{chunk_index}`), so
/// re-running overwrites instead of duplicating. The first embed or
/// upsert failure aborts the run.
pub struct Indexer {
    embedder: Arc<dyn EmbeddingClient>,
    store: Arc<dyn VectorStore>,
    chunk_size: usize,
}

impl Indexer {
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        store: Arc<dyn VectorStore>,
        chunk_size: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            chunk_size,
        }
    }

    /// Indexes every `*.txt` file in `dir`, in filename order.
    pub async fn index_dir(&self, dir: &Path) -> Result<IndexSummary, ApiError> {
        let entries = fs::read_dir(dir).map_err(|err| {
            ApiError::Internal(format!("failed to read {}: {}", dir.display(), err))
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        paths.sort();

        let mut summary = IndexSummary::default();
        for path in paths {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let content = fs::read_to_string(&path).map_err(|err| {
                ApiError::Internal(format!("failed to read {}: {}", path.display(), err))
            })?;

            tracing::info!("processing {}", path.display());
            let chunks = self.index_document(&filename, &content).await.map_err(|err| {
                tracing::error!("indexing {} failed: {}", filename, err);
                err
            })?;
            tracing::info!("indexed {} chunks from {}", chunks, filename);

            summary.documents += 1;
            summary.chunks += chunks;
        }

        Ok(summary)
    }

    /// Indexes a single document, returning the number of chunks written.
    pub async fn index_document(
        &self,
        filename: &str,
        content: &str,
    ) -> Result<usize, ApiError> {
        let mut count = 0;
        for (i, chunk) in word_chunks(content, self.chunk_size).enumerate() {
            let embedding = self.embedder.embed(&chunk).await?;
            let record = VectorRecord {
                id: format!("{}_{}", filename, i),
                values: embedding,
                metadata: ChunkMetadata {
                    text: chunk,
                    filename: filename.to_string(),
                },
            };
            self.store.upsert(vec![record]).await?;
            count += 1;
        }
        Ok(count)
    }
}
