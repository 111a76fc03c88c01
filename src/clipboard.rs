// src/clipboard.rs

use crate::errors::{ChatError, ChatResult};
use copypasta::{ClipboardContext, ClipboardProvider};
use log::debug;

/// Somewhere copied text can be placed.
pub trait Clipboard: Send {
    fn set_text(&mut self, text: &str) -> ChatResult<()>;
}

/// The system clipboard. A fresh context is opened for every copy, since the
/// display connection may come and go while the terminal UI runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> ChatResult<()> {
        ClipboardContext::new()
            .and_then(|mut ctx| ctx.set_contents(text.to_string()))
            .map_err(|e| ChatError::clipboard_error(e.to_string()))?;
        debug!("Copied {} bytes to clipboard", text.len());
        Ok(())
    }
}

/// What gets copied out of a reply: its last fenced code block if it has a
/// closed one, otherwise the whole text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyTarget {
    Code(String),
    Reply(String),
}

impl CopyTarget {
    pub fn from_reply(text: &str) -> Self {
        match last_code_block(text) {
            Some(code) => CopyTarget::Code(code),
            None => CopyTarget::Reply(text.to_string()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            CopyTarget::Code(text) | CopyTarget::Reply(text) => text,
        }
    }

    pub fn confirmation(&self) -> &'static str {
        match self {
            CopyTarget::Code(_) => "Code copied to clipboard",
            CopyTarget::Reply(_) => "Reply copied to clipboard",
        }
    }
}

/// Body of the last ```-fenced block. An unclosed fence is not a block.
pub fn last_code_block(text: &str) -> Option<String> {
    let mut last = None;
    let mut open: Option<Vec<&str>> = None;

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            match open.take() {
                Some(body) => last = Some(body.join("\n")),
                None => open = Some(Vec::new()),
            }
        } else if let Some(body) = open.as_mut() {
            body.push(line);
        }
    }
    last
}
