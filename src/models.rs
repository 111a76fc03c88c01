// src/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// Represents a message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Message {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Message {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// Role of a message on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl From<Sender> for Role {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => Role::User,
            Sender::Bot => Role::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: Role,
    pub content: String,
}

impl ApiMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        ApiMessage {
            role,
            content: content.into(),
        }
    }
}

impl From<&Message> for ApiMessage {
    fn from(message: &Message) -> Self {
        ApiMessage::new(message.sender.into(), message.text.clone())
    }
}

/// Body of a chat completion request: `{"model": ..., "messages": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
}

impl ChatRequest {
    /// One-line description used in API call logs.
    pub fn summary(&self) -> String {
        format!("model={} messages={}", self.model, self.messages.len())
    }
}

/// Logs details of each API call.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiCallLog {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub request_summary: String,
    pub response_status: u16,
    pub response_time_ms: u128,
}
