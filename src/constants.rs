// src/constants.rs

// API Constants
pub const DEFAULT_API_URL: &str = "http://localhost:8000/chat";
pub const DEFAULT_MODEL: &str = "llama3.1";

/// Leading instruction message sent ahead of every conversation history.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are IntegrAI, a helpful assistant. Answer clearly and use markdown for code.";

/// Shown in place of the reply, and raised as an error toast, when a turn fails.
pub const FAILURE_MESSAGE: &str = "Sorry, Something went wrong. I couldn't get a response.";

// Tabs
pub const TAB_NAME_PREFIX: &str = "Chat";

// UI Constants
pub const TOAST_LIFETIME_MS: u64 = 4000;
pub const TOAST_CAPACITY: usize = 16;
pub const EVENT_POLL_MS: u64 = 50;
pub const SIDEBAR_WIDTH: u16 = 24;
