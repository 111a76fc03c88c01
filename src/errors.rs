// src/errors.rs

use thiserror::Error;

/// Errors raised while configuring the client or talking to the chat backend.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response has no readable body")]
    MissingBody,

    #[error("stream error: {0}")]
    Stream(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;

impl ChatError {
    pub fn network_error(msg: impl Into<String>) -> Self {
        ChatError::Network(msg.into())
    }

    pub fn stream_error(msg: impl Into<String>) -> Self {
        ChatError::Stream(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        ChatError::Config(msg.into())
    }

    pub fn clipboard_error(msg: impl Into<String>) -> Self {
        ChatError::Clipboard(msg.into())
    }
}
