use crate::clipboard::{Clipboard, SystemClipboard};
use crate::config::Config;
use crate::controller::{stream_turn, ChatController, TurnUpdate};
use crate::conversation::ConversationId;
use crate::notifier::ToastQueue;
use crate::transport::ChatTransport;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Terminal front-end state: the controller plus everything only the UI needs.
pub struct App {
    pub controller: ChatController,
    pub toasts: ToastQueue,
    /// Draft of the active conversation. Drafts of the other tabs wait in `drafts`.
    pub input: String,
    drafts: HashMap<ConversationId, String>,
    clipboard: Box<dyn Clipboard>,
    /// Lines scrolled up from the bottom of the active conversation.
    pub scroll: u16,
    pub spinner_frame: usize,
    pub should_quit: bool,
    updates_tx: UnboundedSender<TurnUpdate>,
    updates_rx: UnboundedReceiver<TurnUpdate>,
}

impl App {
    pub fn new(config: &Config, transport: Arc<dyn ChatTransport>) -> App {
        let toasts = ToastQueue::default();
        let controller = ChatController::from_config(config, transport, Arc::new(toasts.clone()));
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();

        App {
            controller,
            toasts,
            input: String::new(),
            drafts: HashMap::new(),
            clipboard: Box::new(SystemClipboard),
            scroll: 0,
            spinner_frame: 0,
            should_quit: false,
            updates_tx,
            updates_rx,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> App {
        self.clipboard = clipboard;
        self
    }

    /// Input is disabled while the active conversation streams.
    pub fn input_enabled(&self) -> bool {
        !self.controller.is_streaming()
    }

    /// Sends the input line as a new turn and streams the reply in the
    /// background. Must be called from within a tokio runtime.
    pub fn submit_input(&mut self) -> bool {
        if !self.input_enabled() {
            return false;
        }
        let Some(turn) = self.controller.begin_submit(&self.input) else {
            return false;
        };
        self.input.clear();
        self.scroll = 0;

        tokio::spawn(stream_turn(
            self.controller.transport(),
            turn,
            self.updates_tx.clone(),
        ));
        true
    }

    /// Applies every update that has arrived since the last call.
    pub fn drain_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.updates_rx.try_recv() {
            if self.controller.apply(update) {
                applied += 1;
            }
        }
        if applied > 0 {
            debug!("Applied {} stream updates", applied);
        }
        applied
    }

    pub fn tick(&mut self) {
        if self.controller.tabs().tabs().iter().any(|t| t.conversation.is_streaming()) {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    pub fn copy_reply(&mut self) -> bool {
        self.controller.copy_last_reply(self.clipboard.as_mut())
    }

    pub fn new_chat(&mut self) {
        let previous = self.active_id();
        self.controller.add_tab();
        self.switch_draft(previous);
    }

    pub fn close_chat(&mut self) {
        let previous = self.active_id();
        let index = self.controller.tabs().active_index();
        if self.controller.delete_tab(index) {
            self.switch_draft(previous);
        }
    }

    pub fn next_chat(&mut self) {
        let previous = self.active_id();
        self.controller.next_tab();
        self.switch_draft(previous);
    }

    pub fn previous_chat(&mut self) {
        let previous = self.active_id();
        self.controller.previous_tab();
        self.switch_draft(previous);
    }

    fn active_id(&self) -> ConversationId {
        self.controller.active_conversation().id()
    }

    /// Parks the draft of `previous` (unless its tab is gone) and brings up
    /// the active tab's draft.
    fn switch_draft(&mut self, previous: ConversationId) {
        self.scroll = 0;
        let current = self.active_id();
        if current == previous {
            return;
        }
        let draft = std::mem::take(&mut self.input);
        if self.controller.conversation(previous).is_some() && !draft.is_empty() {
            self.drafts.insert(previous, draft);
        }
        self.input = self.drafts.remove(&current).unwrap_or_default();
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}
