//! Prompt templates and conversation assembly.
//!
//! The augmentation template and persona are data, not logic: the persona
//! comes from configuration, and templates use `$var` placeholders.

use crate::core::config::PersonaConfig;
use crate::llm::types::ChatMessage;

/// Template applied to the last user turn when context was retrieved.
const AUGMENT_TEMPLATE: &str = "Provided Context:\n$context\n\n User query: $query";

/// A text template with `$name` placeholders.
///
/// Unknown placeholders are left verbatim; substituted values are not
/// re-scanned.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut chars = self.template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }

            let mut name = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    name.push(next);
                    chars.next();
                } else {
                    break;
                }
            }

            match vars.iter().find(|(key, _)| *key == name) {
                Some((_, value)) => out.push_str(value),
                None => {
                    out.push('$');
                    out.push_str(&name);
                }
            }
        }

        out
    }
}

/// Renders the context-injection rewrite of a user query.
pub fn augment_query(context: &str, query: &str) -> String {
    PromptTemplate::new(AUGMENT_TEMPLATE).render(&[("context", context), ("query", query)])
}

/// The most recent user turn, scanning from the end of the conversation.
pub fn last_user_message(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|msg| msg.role == "user")
        .map(|msg| msg.content.as_str())
}

/// Returns a new conversation with the last user message's content
/// replaced. The input is never mutated; all other messages keep their
/// position and content.
pub fn with_augmented_user(messages: &[ChatMessage], content: String) -> Vec<ChatMessage> {
    let mut out = messages.to_vec();
    if let Some(msg) = out.iter_mut().rev().find(|msg| msg.role == "user") {
        msg.content = content;
    }
    out
}

/// Prepends the persona (system prompt + few-shot exemplars) ahead of the
/// conversation. The caller's conversation is never forwarded bare.
pub fn assemble(persona: &PersonaConfig, conversation: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut assembled =
        Vec::with_capacity(1 + persona.few_shot.len() + conversation.len());
    assembled.push(ChatMessage::new("system", persona.system_prompt.clone()));
    assembled.extend(persona.few_shot.iter().cloned());
    assembled.extend(conversation);
    assembled
}
