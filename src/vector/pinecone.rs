use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{QueryMatch, VectorRecord, VectorStore};
use crate::core::errors::ApiError;

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Client for the Pinecone index data plane.
#[derive(Clone)]
pub struct PineconeStore {
    endpoint: String,
    api_key: String,
    namespace: Option<String>,
    client: Client,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

impl PineconeStore {
    pub fn new(
        endpoint: &str,
        api_key: &str,
        namespace: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            namespace,
            client,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .post(format!("{}{}", self.endpoint, path))
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
    }

    async fn post_with_retry(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<reqwest::Response, ApiError> {
        match self.post(path, body).await {
            Ok(res) => Ok(res),
            Err(first) => {
                tracing::warn!("vector store request failed, retrying: {}", first);
                tokio::time::sleep(RETRY_BACKOFF).await;
                self.post(path, body).await.map_err(ApiError::upstream)
            }
        }
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), ApiError> {
        let mut body = json!({ "vectors": records });
        if let (Some(ns), Some(obj)) = (&self.namespace, body.as_object_mut()) {
            obj.insert("namespace".to_string(), json!(ns));
        }

        let res = self.post_with_retry("/vectors/upsert", &body).await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "vector upsert failed: {}: {}",
                status, text
            )));
        }

        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>, ApiError> {
        let mut body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });
        if let (Some(ns), Some(obj)) = (&self.namespace, body.as_object_mut()) {
            obj.insert("namespace".to_string(), json!(ns));
        }

        let res = self.post_with_retry("/query", &body).await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "vector query failed: {}: {}",
                status, text
            )));
        }

        let payload: QueryResponse = res.json().await.map_err(ApiError::upstream)?;
        Ok(payload.matches)
    }
}
