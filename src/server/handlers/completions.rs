//! The retrieval-augmented `/v1/chat/completions` endpoint.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::core::errors::ApiError;
use crate::llm::types::ChatRequest;
use crate::rag::prompt;
use crate::server::protocol::{
    completion_id, ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse,
};
use crate::state::AppState;

/// The SSE end-of-stream sentinel.
const DONE_SENTINEL: &str = "[DONE]";

pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Response, ApiError> {
    if request.messages.is_empty() {
        return Err(ApiError::BadRequest(
            "messages must be a non-empty array".to_string(),
        ));
    }

    let echo_model = request
        .model
        .clone()
        .unwrap_or_else(|| state.config.server.default_model.clone());

    // Rewrite the most recent user turn with retrieved context; a
    // conversation without a user turn passes through untouched.
    let conversation = match prompt::last_user_message(&request.messages) {
        Some(query) => {
            let context = state.retriever.search(query).await?;
            let augmented = prompt::augment_query(&context, query);
            prompt::with_augmented_user(&request.messages, augmented)
        }
        None => request.messages.clone(),
    };

    let assembled = prompt::assemble(&state.config.persona, conversation);
    let mut chat_request = ChatRequest::new(assembled);
    chat_request.temperature = request.temperature;
    chat_request.top_p = request.top_p;
    chat_request.max_tokens = request.max_tokens;

    let id = completion_id();
    let created = chrono::Utc::now().timestamp();
    let upstream_model = state.config.llm.model.clone();

    if request.stream {
        let rx = state.llm.stream_chat(chat_request, &upstream_model).await?;
        let payloads = stream_payloads(id, created, echo_model, rx);
        let stream = ReceiverStream::new(payloads)
            .map(|payload| Ok::<_, Infallible>(Event::default().data(payload)));
        Ok(Sse::new(stream).into_response())
    } else {
        let content = state.llm.chat(chat_request, &upstream_model).await?;
        let response = ChatCompletionResponse::new(id, created, echo_model, content);
        Ok(Json(response).into_response())
    }
}

/// Re-wraps upstream content deltas into chunk-envelope payload strings:
/// one chunk per delta, then the terminal chunk, then `[DONE]`.
///
/// Dropping the returned receiver (client disconnect) makes the relay
/// task's send fail, which drops the upstream receiver and cancels the
/// upstream read. A mid-stream upstream failure emits one error frame
/// followed by `[DONE]` so the stream always terminates.
fn stream_payloads(
    id: String,
    created: i64,
    model: String,
    mut rx: mpsc::Receiver<Result<String, ApiError>>,
) -> mpsc::Receiver<String> {
    let (tx, out) = mpsc::channel(32);

    tokio::spawn(async move {
        while let Some(delta) = rx.recv().await {
            match delta {
                Ok(content) => {
                    let chunk = ChatCompletionChunk::content(&id, created, &model, content);
                    let payload = serde_json::to_string(&chunk).unwrap_or_default();
                    if tx.send(payload).await.is_err() {
                        return;
                    }
                }
                Err(err) => {
                    tracing::error!("upstream stream failed: {}", err);
                    let frame = json!({
                        "error": {"message": err.to_string(), "type": "upstream_error"}
                    });
                    let _ = tx.send(frame.to_string()).await;
                    let _ = tx.send(DONE_SENTINEL.to_string()).await;
                    return;
                }
            }
        }

        let terminal = ChatCompletionChunk::done(&id, created, &model);
        let payload = serde_json::to_string(&terminal).unwrap_or_default();
        if tx.send(payload).await.is_err() {
            return;
        }
        let _ = tx.send(DONE_SENTINEL.to_string()).await;
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;
    use crate::embedding::EmbeddingClient;
    use crate::llm::provider::LlmProvider;
    use crate::llm::types::ChatMessage;
    use crate::rag::Retriever;
    use crate::vector::{ChunkMetadata, QueryMatch, VectorRecord, VectorStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingClient for CountingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0])
        }
    }

    struct CannedStore {
        matches: Vec<QueryMatch>,
    }

    #[async_trait]
    impl VectorStore for CannedStore {
        async fn upsert(&self, _records: Vec<VectorRecord>) -> Result<(), ApiError> {
            Ok(())
        }

        async fn query(
            &self,
            _vector: &[f32],
            _top_k: usize,
        ) -> Result<Vec<QueryMatch>, ApiError> {
            Ok(self.matches.clone())
        }
    }

    #[derive(Default)]
    struct FakeLlm {
        seen: Mutex<Vec<(ChatRequest, String)>>,
        deltas: Vec<String>,
    }

    #[async_trait]
    impl LlmProvider for FakeLlm {
        fn name(&self) -> &str {
            "fake"
        }

        async fn health_check(&self) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError> {
            self.seen
                .lock()
                .unwrap()
                .push((request, model_id.to_string()));
            Ok("BREAKING: it works".to_string())
        }

        async fn stream_chat(
            &self,
            request: ChatRequest,
            model_id: &str,
        ) -> Result<mpsc::Receiver<Result<String, ApiError>>, ApiError> {
            self.seen
                .lock()
                .unwrap()
                .push((request, model_id.to_string()));
            let (tx, rx) = mpsc::channel(8);
            let deltas = self.deltas.clone();
            tokio::spawn(async move {
                for delta in deltas {
                    if tx.send(Ok(delta)).await.is_err() {
                        return;
                    }
                }
            });
            Ok(rx)
        }
    }

    fn match_for(text: &str) -> QueryMatch {
        QueryMatch {
            id: format!("{}_0", text),
            score: 0.9,
            metadata: Some(ChunkMetadata {
                text: text.to_string(),
                filename: "news.txt".to_string(),
            }),
        }
    }

    struct Harness {
        state: Arc<AppState>,
        llm: Arc<FakeLlm>,
        embedder: Arc<CountingEmbedder>,
    }

    fn harness(matches: Vec<QueryMatch>, deltas: Vec<String>) -> Harness {
        let mut config = AppConfig::default();
        config.llm.model = "backend-model".to_string();
        config.vector_store.endpoint = "https://unused.example".to_string();

        let embedder = Arc::new(CountingEmbedder {
            calls: AtomicUsize::new(0),
        });
        let retriever = Retriever::new(
            embedder.clone(),
            Arc::new(CannedStore { matches }),
            config.rag.top_k,
        );
        let llm = Arc::new(FakeLlm {
            seen: Mutex::new(Vec::new()),
            deltas,
        });
        let state = AppState::with_components(config, llm.clone(), retriever);
        Harness {
            state,
            llm,
            embedder,
        }
    }

    fn request_json(body: serde_json::Value) -> ChatCompletionRequest {
        serde_json::from_value(body).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn rejects_empty_message_list() {
        let h = harness(vec![], vec![]);
        let err = chat_completions(
            State(h.state),
            Json(request_json(json!({"messages": []}))),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        // never forwarded upstream
        assert!(h.llm.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn augments_last_user_turn_with_context() {
        let h = harness(vec![match_for("A"), match_for("B")], vec![]);
        let request = request_json(json!({
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "Tell me about X"},
            ]
        }));

        chat_completions(State(h.state.clone()), Json(request))
            .await
            .unwrap();

        let seen = h.llm.seen.lock().unwrap();
        let (sent, model_id) = &seen[0];
        assert_eq!(model_id, "backend-model");

        let persona = &h.state.config.persona;
        // system + few-shot + original two messages
        assert_eq!(sent.messages.len(), 1 + persona.few_shot.len() + 2);
        assert_eq!(sent.messages[0].role, "system");
        assert_eq!(sent.messages[0].content, persona.system_prompt);
        assert_eq!(
            sent.messages.last().unwrap().content,
            "Provided Context:\nA\n\nB\n\n User query: Tell me about X"
        );
    }

    #[tokio::test]
    async fn empty_retrieval_still_applies_template() {
        let h = harness(vec![], vec![]);
        let request = request_json(json!({
            "messages": [{"role": "user", "content": "Anything new?"}]
        }));

        chat_completions(State(h.state), Json(request)).await.unwrap();

        let seen = h.llm.seen.lock().unwrap();
        assert_eq!(
            seen[0].0.messages.last().unwrap().content,
            "Provided Context:\n\n\n User query: Anything new?"
        );
    }

    #[tokio::test]
    async fn conversation_without_user_turn_skips_retrieval() {
        let h = harness(vec![match_for("A")], vec![]);
        let request = request_json(json!({
            "messages": [{"role": "system", "content": "just a system turn"}]
        }));

        chat_completions(State(h.state), Json(request)).await.unwrap();

        assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
        let seen = h.llm.seen.lock().unwrap();
        let sent = &seen[0].0.messages;
        assert_eq!(sent.last().unwrap().content, "just a system turn");
    }

    #[tokio::test]
    async fn non_streaming_envelope_has_stop_and_fresh_id() {
        let h = harness(vec![], vec![]);
        let request = json!({
            "model": "tech-news-bot",
            "messages": [{"role": "user", "content": "hi"}]
        });

        let first = chat_completions(
            State(h.state.clone()),
            Json(request_json(request.clone())),
        )
        .await
        .unwrap();
        let second = chat_completions(State(h.state), Json(request_json(request)))
            .await
            .unwrap();

        let first: serde_json::Value =
            serde_json::from_str(&body_string(first).await).unwrap();
        let second: serde_json::Value =
            serde_json::from_str(&body_string(second).await).unwrap();

        assert_eq!(first["object"], "chat.completion");
        assert_eq!(first["model"], "tech-news-bot");
        assert_eq!(first["choices"][0]["finish_reason"], "stop");
        assert_eq!(first["choices"][0]["message"]["content"], "BREAKING: it works");
        assert_ne!(first["id"], second["id"]);
    }

    #[tokio::test]
    async fn streaming_emits_deltas_terminal_and_done() {
        let h = harness(vec![], vec!["Hel".to_string(), "lo".to_string()]);
        let request = request_json(json!({
            "model": "tech-news-bot",
            "stream": true,
            "messages": [{"role": "user", "content": "hi"}]
        }));

        let response = chat_completions(State(h.state), Json(request)).await.unwrap();
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap(),
            "text/event-stream"
        );

        let body = body_string(response).await;
        let frames: Vec<&str> = body
            .lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .collect();

        assert_eq!(frames.len(), 4);
        let first: serde_json::Value = serde_json::from_str(frames[0]).unwrap();
        assert_eq!(first["object"], "chat.completion.chunk");
        assert_eq!(first["model"], "tech-news-bot");
        assert_eq!(first["choices"][0]["delta"]["content"], "Hel");
        let second: serde_json::Value = serde_json::from_str(frames[1]).unwrap();
        assert_eq!(second["choices"][0]["delta"]["content"], "lo");
        let terminal: serde_json::Value = serde_json::from_str(frames[2]).unwrap();
        assert_eq!(terminal["choices"][0]["delta"], json!({}));
        assert_eq!(terminal["choices"][0]["finish_reason"], "stop");
        assert_eq!(frames[3], "[DONE]");
    }

    #[tokio::test]
    async fn stream_payloads_orders_frames() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(Ok("Hel".to_string())).await.unwrap();
        tx.send(Ok("lo".to_string())).await.unwrap();
        drop(tx);

        let mut out = stream_payloads("chatcmpl-test".to_string(), 1, "m".to_string(), rx);
        let mut payloads = Vec::new();
        while let Some(payload) = out.recv().await {
            payloads.push(payload);
        }

        assert_eq!(payloads.len(), 4);
        assert!(payloads[0].contains("\"Hel\""));
        assert!(payloads[1].contains("\"lo\""));
        assert!(payloads[2].contains("\"finish_reason\":\"stop\""));
        assert_eq!(payloads[3], "[DONE]");
    }

    #[tokio::test]
    async fn stream_payloads_terminates_on_upstream_error() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(Ok("partial".to_string())).await.unwrap();
        tx.send(Err(ApiError::Upstream("connection reset".to_string())))
            .await
            .unwrap();
        drop(tx);

        let mut out = stream_payloads("chatcmpl-test".to_string(), 1, "m".to_string(), rx);
        let mut payloads = Vec::new();
        while let Some(payload) = out.recv().await {
            payloads.push(payload);
        }

        assert_eq!(payloads.len(), 3);
        assert!(payloads[1].contains("upstream_error"));
        assert_eq!(payloads[2], "[DONE]");
    }
}
