use std::fmt;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry of the chat log. Position in the log is its only identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub initialized: bool,
}

/// Append-only message log with change notification.
///
/// Every mutation wakes all receivers handed out by [`subscribe`](Self::subscribe).
/// Appends from overlapping requests land in the order they happen, so two
/// in-flight replies end up in completion order, not submission order.
#[derive(Debug)]
pub struct ConversationStore {
    state: watch::Sender<ConversationState>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConversationState::default());
        Self { state }
    }

    pub fn append_message(&self, role: Role, text: impl Into<String>) {
        let text = text.into();
        debug!(%role, len = text.len(), "Appending message");
        let message = Message { role, text };
        self.state.send_modify(|state| state.messages.push(message));
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    /// Flips the flag to true. Returns `false` if it already was.
    pub fn mark_initialized(&self) -> bool {
        self.state.send_if_modified(|state| {
            if state.initialized {
                false
            } else {
                state.initialized = true;
                true
            }
        })
    }

    pub fn snapshot(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }
}
