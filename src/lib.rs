// src/lib.rs

pub mod app;
pub mod clipboard;
pub mod config;
pub mod constants;
pub mod controller;
pub mod conversation;
pub mod errors;
pub mod key_handlers;
pub mod logging;
pub mod models;
pub mod notifier;
pub mod tabs;
pub mod transport;
pub mod ui;

pub use app::App;
pub use controller::{ChatController, SubmitOutcome, TurnRequest, TurnUpdate};
pub use errors::{ChatError, ChatResult};
