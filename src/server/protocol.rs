//! OpenAI-compatible wire shapes for `/v1/chat/completions`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::types::ChatMessage;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Delta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Fresh per-request id correlating a completion with its stream chunks.
pub fn completion_id() -> String {
    let uuid = Uuid::new_v4().to_string();
    format!("chatcmpl-{}", &uuid[..12])
}

impl ChatCompletionResponse {
    pub fn new(id: String, created: i64, model: String, content: String) -> Self {
        Self {
            id,
            object: "chat.completion".to_string(),
            created,
            model,
            choices: vec![Choice {
                index: 0,
                message: ChatMessage::new("assistant", content),
                finish_reason: Some("stop".to_string()),
            }],
        }
    }
}

impl ChatCompletionChunk {
    /// A chunk carrying one content delta; `finish_reason` stays null.
    pub fn content(id: &str, created: i64, model: &str, content: String) -> Self {
        Self {
            id: id.to_string(),
            object: "chat.completion.chunk".to_string(),
            created,
            model: model.to_string(),
            choices: vec![ChunkChoice {
                index: 0,
                delta: Delta {
                    content: Some(content),
                },
                finish_reason: None,
            }],
        }
    }

    /// The terminal chunk: empty delta, `finish_reason: "stop"`.
    pub fn done(id: &str, created: i64, model: &str) -> Self {
        Self {
            id: id.to_string(),
            object: "chat.completion.chunk".to_string(),
            created,
            model: model.to_string(),
            choices: vec![ChunkChoice {
                index: 0,
                delta: Delta::default(),
                finish_reason: Some("stop".to_string()),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_ids_are_prefixed_and_unique() {
        let first = completion_id();
        let second = completion_id();
        assert!(first.starts_with("chatcmpl-"));
        assert_eq!(first.len(), "chatcmpl-".len() + 12);
        assert_ne!(first, second);
    }

    #[test]
    fn response_envelope_shape() {
        let response = ChatCompletionResponse::new(
            "chatcmpl-abc".to_string(),
            1_700_000_000,
            "tech-news-bot".to_string(),
            "hello".to_string(),
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["object"], "chat.completion");
        assert_eq!(value["model"], "tech-news-bot");
        assert_eq!(value["choices"][0]["index"], 0);
        assert_eq!(value["choices"][0]["message"]["role"], "assistant");
        assert_eq!(value["choices"][0]["message"]["content"], "hello");
        assert_eq!(value["choices"][0]["finish_reason"], "stop");
    }

    #[test]
    fn content_chunk_keeps_finish_reason_null() {
        let chunk =
            ChatCompletionChunk::content("chatcmpl-abc", 1_700_000_000, "m", "Hel".to_string());
        let value = serde_json::to_value(&chunk).unwrap();

        assert_eq!(value["object"], "chat.completion.chunk");
        assert_eq!(value["choices"][0]["delta"]["content"], "Hel");
        assert!(value["choices"][0]["finish_reason"].is_null());
    }

    #[test]
    fn terminal_chunk_has_empty_delta_and_stop() {
        let chunk = ChatCompletionChunk::done("chatcmpl-abc", 1_700_000_000, "m");
        let value = serde_json::to_value(&chunk).unwrap();

        assert_eq!(value["choices"][0]["delta"], serde_json::json!({}));
        assert_eq!(value["choices"][0]["finish_reason"], "stop");
    }

    #[test]
    fn request_defaults_apply() {
        let request: ChatCompletionRequest = serde_json::from_str("{}").unwrap();
        assert!(request.model.is_none());
        assert!(request.messages.is_empty());
        assert!(!request.stream);
    }
}
