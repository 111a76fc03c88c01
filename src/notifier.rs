// src/notifier.rs

use crate::constants::{TOAST_CAPACITY, TOAST_LIFETIME_MS};
use log::{error, info, warn};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Success,
    Error,
    Warn,
    Info,
}

/// Fire-and-forget sink for user-facing alerts.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: NotifyKind);
}

/// Sends notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, kind: NotifyKind) {
        match kind {
            NotifyKind::Error => error!("{}", message),
            NotifyKind::Warn => warn!("{}", message),
            NotifyKind::Success | NotifyKind::Info => info!("{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: NotifyKind,
    pub raised_at: Instant,
}

/// Toasts waiting to be shown by the terminal UI. Clones share the same queue.
#[derive(Debug, Clone)]
pub struct ToastQueue {
    toasts: Arc<Mutex<VecDeque<Toast>>>,
    lifetime: Duration,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(Duration::from_millis(TOAST_LIFETIME_MS))
    }
}

impl ToastQueue {
    pub fn new(lifetime: Duration) -> Self {
        ToastQueue {
            toasts: Arc::new(Mutex::new(VecDeque::with_capacity(TOAST_CAPACITY))),
            lifetime,
        }
    }

    /// Drops expired toasts and returns the newest one still visible.
    pub fn current(&self) -> Option<Toast> {
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        let lifetime = self.lifetime;
        toasts.retain(|t| t.raised_at.elapsed() < lifetime);
        toasts.back().cloned()
    }

    pub fn len(&self) -> usize {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, message: &str, kind: NotifyKind) {
        LogNotifier.notify(message, kind);
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        if toasts.len() == TOAST_CAPACITY {
            toasts.pop_front();
        }
        toasts.push_back(Toast {
            message: message.to_string(),
            kind,
            raised_at: Instant::now(),
        });
    }
}
