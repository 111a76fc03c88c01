// src/conversation.rs

use crate::models::Message;
use log::{debug, warn};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONVERSATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique handle for a conversation. Stream results are routed by id,
/// so a tab can be moved or deleted while its reply is still arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationId(u64);

impl ConversationId {
    fn next() -> Self {
        ConversationId(NEXT_CONVERSATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conversation-{}", self.0)
    }
}

/// Where a conversation is in its request/stream/update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingFirstByte,
    Streaming,
    Failed,
}

/// How the most recent turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    Failed,
}

/// The in-flight request of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub outgoing_text: String,
    placeholder: usize,
}

impl PendingRequest {
    /// Index of the bot message being filled by the stream.
    pub fn placeholder(&self) -> usize {
        self.placeholder
    }
}

/// One conversation: its messages plus the state of the turn in progress.
#[derive(Debug)]
pub struct Conversation {
    id: ConversationId,
    messages: Vec<Message>,
    state: TurnState,
    pending: Option<PendingRequest>,
    last_outcome: Option<TurnOutcome>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Conversation {
            id: ConversationId::next(),
            messages: Vec::new(),
            state: TurnState::Idle,
            pending: None,
            last_outcome: None,
        }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    pub fn last_outcome(&self) -> Option<TurnOutcome> {
        self.last_outcome
    }

    /// True while a request is in flight. Input must be blocked in this window.
    pub fn is_streaming(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a turn: appends the user message and an empty bot placeholder.
    ///
    /// Returns the history as it was before either was appended, or `None`
    /// when the text is blank or a turn is already in flight.
    pub(crate) fn begin_turn(&mut self, text: &str) -> Option<Vec<Message>> {
        if text.trim().is_empty() {
            return None;
        }
        if self.state != TurnState::Idle {
            debug!("{}: submit ignored while {:?}", self.id, self.state);
            return None;
        }

        let history = self.messages.clone();
        self.messages.push(Message::user(text));
        self.messages.push(Message::bot(""));
        self.pending = Some(PendingRequest {
            outgoing_text: text.to_string(),
            placeholder: self.messages.len() - 1,
        });
        self.transition(TurnState::AwaitingFirstByte);
        Some(history)
    }

    /// Overwrites the placeholder with the latest cumulative reply text.
    pub(crate) fn receive(&mut self, snapshot: String) -> bool {
        if !matches!(
            self.state,
            TurnState::AwaitingFirstByte | TurnState::Streaming
        ) {
            warn!("{}: chunk dropped while {:?}", self.id, self.state);
            return false;
        }
        let Some(placeholder) = self.pending.as_ref().map(PendingRequest::placeholder) else {
            return false;
        };
        if let Some(message) = self.messages.get_mut(placeholder) {
            message.text = snapshot;
        }
        if self.state == TurnState::AwaitingFirstByte {
            self.transition(TurnState::Streaming);
        }
        true
    }

    /// Ends a successful turn.
    pub(crate) fn finish(&mut self) -> bool {
        if !matches!(
            self.state,
            TurnState::AwaitingFirstByte | TurnState::Streaming
        ) {
            warn!("{}: stream end ignored while {:?}", self.id, self.state);
            return false;
        }
        self.pending = None;
        self.last_outcome = Some(TurnOutcome::Completed);
        self.transition(TurnState::Idle);
        true
    }

    /// Ends a failed turn: the placeholder is replaced by `apology` and the
    /// conversation settles back to idle.
    pub(crate) fn fail(&mut self, apology: &str) -> bool {
        if self.state == TurnState::Idle {
            warn!("{}: failure ignored while idle", self.id);
            return false;
        }
        if let Some(placeholder) = self.pending.take().map(|p| p.placeholder) {
            if let Some(message) = self.messages.get_mut(placeholder) {
                message.text = apology.to_string();
            }
        }
        self.last_outcome = Some(TurnOutcome::Failed);
        self.transition(TurnState::Failed);
        self.transition(TurnState::Idle);
        true
    }

    fn transition(&mut self, next: TurnState) {
        debug!("{}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }
}
