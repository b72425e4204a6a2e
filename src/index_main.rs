//! Offline indexing entry point: populates the vector store from the
//! configured source directory. Run this once before serving queries.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use newsdesk::core::config::AppConfig;
use newsdesk::core::logging;
use newsdesk::embedding::OpenAiEmbedder;
use newsdesk::rag::Indexer;
use newsdesk::vector::PineconeStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init(config.server.log_dir.as_deref());

    let timeout = Duration::from_secs(config.http.request_timeout_secs);
    let embedder = Arc::new(OpenAiEmbedder::new(
        &config.embedding.base_url,
        &config.embedding.api_key,
        &config.embedding.model,
        timeout,
    )?);
    let store = Arc::new(PineconeStore::new(
        &config.vector_store.endpoint,
        &config.vector_store.api_key,
        config.vector_store.namespace.clone(),
        timeout,
    )?);

    let indexer = Indexer::new(embedder, store, config.rag.chunk_size);
    let summary = indexer
        .index_dir(&config.rag.source_dir)
        .await
        .context("Indexing failed")?;

    tracing::info!(
        "All files indexed: {} chunks from {} documents",
        summary.chunks,
        summary.documents
    );
    Ok(())
}
