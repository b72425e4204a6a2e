//! Terminal chat client for the completion server.
//!
//! Connects to a local or shared deployment (set `API_BASE_URL`), keeps
//! the conversation history client-side, and streams responses as they
//! arrive. The transcript is written to `conversation.json` on exit.

use std::env;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Context;

use newsdesk::llm::provider::LlmProvider;
use newsdesk::llm::types::{ChatMessage, ChatRequest};
use newsdesk::llm::OpenAiProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url =
        env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000/v1".to_string());
    // The server does not validate keys; any placeholder works.
    let client = OpenAiProvider::new(&base_url, "local-api-key", Duration::from_secs(300))?;

    println!("Connected to {}. Type 'quit' or 'exit' to leave.", base_url);

    let mut history: Vec<ChatMessage> = Vec::new();
    let stdin = io::stdin();

    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit") {
            break;
        }

        history.push(ChatMessage::new("user", input));

        let request = ChatRequest::new(history.clone());
        let mut rx = client.stream_chat(request, "tech-news-bot").await?;

        print!("Bot: ");
        io::stdout().flush()?;
        let mut response = String::new();
        while let Some(delta) = rx.recv().await {
            match delta {
                Ok(text) => {
                    print!("{}", text);
                    io::stdout().flush()?;
                    response.push_str(&text);
                }
                Err(err) => {
                    eprintln!("\nstream error: {}", err);
                    break;
                }
            }
        }
        println!();

        history.push(ChatMessage::new("assistant", response));
    }

    let file = File::create("conversation.json").context("Failed to save conversation")?;
    serde_json::to_writer_pretty(file, &history)?;
    println!("Conversation saved to conversation.json");
    Ok(())
}
