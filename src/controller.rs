//! Streaming chat controller.
//!
//! A turn runs in three steps:
//!
//! 1. [`ChatController::begin_submit`] appends the user message and an empty
//!    bot placeholder to the active conversation and builds the request.
//! 2. [`drive_turn`] opens the transport and threads an accumulator through
//!    the chunk loop, emitting the full reply-so-far after every chunk.
//! 3. [`ChatController::apply`] writes each update into the conversation it
//!    belongs to.
//!
//! [`ChatController::submit`] does all three in-line. The terminal UI instead
//! spawns [`stream_turn`] so it can keep drawing while the reply arrives.

use std::sync::Arc;

use futures::StreamExt;
use log::{debug, error, info, warn};
use tokio::sync::mpsc::UnboundedSender;

use crate::clipboard::{Clipboard, CopyTarget};
use crate::config::Config;
use crate::constants::FAILURE_MESSAGE;
use crate::conversation::{Conversation, ConversationId};
use crate::errors::ChatError;
use crate::models::{ApiMessage, ChatRequest, Message, Role, Sender};
use crate::notifier::{Notifier, NotifyKind};
use crate::tabs::TabRegistry;
use crate::transport::ChatTransport;

/// Result of [`ChatController::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank text; nothing changed.
    Rejected,
    /// The active conversation already has a request in flight; nothing changed.
    Busy,
    Completed,
    Failed,
}

/// A started turn, ready to hand to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub conversation: ConversationId,
    pub request: ChatRequest,
}

/// Progress of a turn, addressed to the conversation that started it.
#[derive(Debug)]
pub enum TurnUpdate {
    /// Cumulative reply text received so far.
    Progress {
        conversation: ConversationId,
        text: String,
    },
    Finished {
        conversation: ConversationId,
    },
    Failed {
        conversation: ConversationId,
        error: ChatError,
    },
}

impl TurnUpdate {
    pub fn conversation(&self) -> ConversationId {
        match self {
            TurnUpdate::Progress { conversation, .. }
            | TurnUpdate::Finished { conversation }
            | TurnUpdate::Failed { conversation, .. } => *conversation,
        }
    }
}

/// Opens the transport for `turn` and emits its updates in arrival order.
/// Always ends with exactly one `Finished` or `Failed`.
pub async fn drive_turn<F>(transport: &dyn ChatTransport, turn: &TurnRequest, mut emit: F)
where
    F: FnMut(TurnUpdate),
{
    let conversation = turn.conversation;

    let mut stream = match transport.open(&turn.request).await {
        Ok(stream) => stream,
        Err(error) => {
            emit(TurnUpdate::Failed {
                conversation,
                error,
            });
            return;
        }
    };

    let mut accumulated = String::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(text) => {
                accumulated.push_str(&text);
                // Each update carries the whole reply so far, so a receiver
                // only ever needs the latest one. Long replies pay a copy per chunk.
                emit(TurnUpdate::Progress {
                    conversation,
                    text: accumulated.clone(),
                });
            }
            Err(error) => {
                emit(TurnUpdate::Failed {
                    conversation,
                    error,
                });
                return;
            }
        }
    }

    emit(TurnUpdate::Finished { conversation });
}

/// [`drive_turn`] with its updates sent over a channel.
pub async fn stream_turn(
    transport: Arc<dyn ChatTransport>,
    turn: TurnRequest,
    updates: UnboundedSender<TurnUpdate>,
) {
    drive_turn(transport.as_ref(), &turn, |update| {
        if updates.send(update).is_err() {
            debug!("{}: update receiver gone", turn.conversation);
        }
    })
    .await;
}

/// Owns the tabs and drives chat turns against the transport.
pub struct ChatController {
    tabs: TabRegistry,
    transport: Arc<dyn ChatTransport>,
    notifier: Arc<dyn Notifier>,
    model: String,
    system_prompt: String,
}

impl std::fmt::Debug for ChatController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatController")
            .field("tabs", &self.tabs)
            .field("model", &self.model)
            .finish()
    }
}

impl ChatController {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        notifier: Arc<dyn Notifier>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            tabs: TabRegistry::new(),
            transport,
            notifier,
            model: model.into(),
            system_prompt: system_prompt.into(),
        }
    }

    pub fn from_config(
        config: &Config,
        transport: Arc<dyn ChatTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(
            transport,
            notifier,
            config.model.clone(),
            config.system_prompt.clone(),
        )
    }

    pub fn tabs(&self) -> &TabRegistry {
        &self.tabs
    }

    pub fn active_conversation(&self) -> &Conversation {
        &self.tabs.active().conversation
    }

    pub fn conversation(&self, id: ConversationId) -> Option<&Conversation> {
        self.tabs.get(id)
    }

    /// Whether the active conversation has a request in flight.
    pub fn is_streaming(&self) -> bool {
        self.active_conversation().is_streaming()
    }

    pub fn transport(&self) -> Arc<dyn ChatTransport> {
        Arc::clone(&self.transport)
    }

    /// System message, then `history`, then the new user turn.
    pub fn build_request(&self, history: &[Message], text: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ApiMessage::new(Role::System, self.system_prompt.clone()));
        messages.extend(history.iter().map(ApiMessage::from));
        messages.push(ApiMessage::new(Role::User, text));
        ChatRequest {
            model: self.model.clone(),
            messages,
        }
    }

    /// Starts a turn in the active conversation. Returns `None` for blank
    /// text or while that conversation is already streaming.
    pub fn begin_submit(&mut self, text: &str) -> Option<TurnRequest> {
        let conversation = &mut self.tabs.active_mut().conversation;
        let id = conversation.id();
        let history = conversation.begin_turn(text)?;
        info!("{}: submitting turn ({} prior messages)", id, history.len());

        Some(TurnRequest {
            conversation: id,
            request: self.build_request(&history, text),
        })
    }

    /// Runs a whole turn in the active conversation. Never returns an error:
    /// failures end up as the apology message plus a notification.
    pub async fn submit(&mut self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Rejected;
        }
        if self.is_streaming() {
            return SubmitOutcome::Busy;
        }
        let Some(turn) = self.begin_submit(text) else {
            return SubmitOutcome::Busy;
        };

        let transport = Arc::clone(&self.transport);
        let mut outcome = SubmitOutcome::Completed;
        drive_turn(transport.as_ref(), &turn, |update| {
            if matches!(update, TurnUpdate::Failed { .. }) {
                outcome = SubmitOutcome::Failed;
            }
            self.apply(update);
        })
        .await;
        outcome
    }

    /// Applies one turn update. Updates for conversations that no longer
    /// exist are discarded. Returns whether anything changed.
    pub fn apply(&mut self, update: TurnUpdate) -> bool {
        let id = update.conversation();
        let Some(conversation) = self.tabs.get_mut(id) else {
            debug!("{}: update discarded, conversation closed", id);
            return false;
        };

        match update {
            TurnUpdate::Progress { text, .. } => conversation.receive(text),
            TurnUpdate::Finished { .. } => {
                let finished = conversation.finish();
                if finished {
                    info!("{}: turn completed", id);
                }
                finished
            }
            TurnUpdate::Failed { error, .. } => {
                error!("{}: turn failed: {}", id, error);
                let failed = conversation.fail(FAILURE_MESSAGE);
                if failed {
                    self.notifier.notify(FAILURE_MESSAGE, NotifyKind::Error);
                }
                failed
            }
        }
    }

    /// Copies the active conversation's last finished bot reply (or its last
    /// fenced code block) to `clipboard`, then notifies the outcome.
    pub fn copy_last_reply(&self, clipboard: &mut dyn Clipboard) -> bool {
        let conversation = self.active_conversation();
        if conversation.is_streaming() {
            self.notifier
                .notify("Wait for the reply to finish before copying", NotifyKind::Warn);
            return false;
        }
        let Some(reply) = conversation
            .messages()
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Bot)
        else {
            self.notifier.notify("Nothing to copy yet", NotifyKind::Info);
            return false;
        };

        let target = CopyTarget::from_reply(&reply.text);
        match clipboard.set_text(target.text()) {
            Ok(()) => {
                self.notifier.notify(target.confirmation(), NotifyKind::Success);
                true
            }
            Err(e) => {
                warn!("{}: copy failed: {}", conversation.id(), e);
                self.notifier
                    .notify("Could not copy to clipboard", NotifyKind::Error);
                false
            }
        }
    }

    pub fn add_tab(&mut self) -> usize {
        self.tabs.add_tab()
    }

    pub fn delete_tab(&mut self, index: usize) -> bool {
        self.tabs.delete_tab(index)
    }

    pub fn select_tab(&mut self, index: usize) -> bool {
        self.tabs.select_tab(index)
    }

    pub fn next_tab(&mut self) {
        self.tabs.next_tab();
    }

    pub fn previous_tab(&mut self) {
        self.tabs.previous_tab();
    }
}
