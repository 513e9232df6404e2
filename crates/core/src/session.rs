//! Session store: the in-memory transcript of one user session.
//!
//! Owns the conversation for the lifetime of the session. Turns are only
//! appended between graph executions. A failed execution leaves a notice
//! for the presentation layer instead of a turn.

use crate::message::{Conversation, Message};
use serde::Serialize;

/// A notice surfaced to the user after a failed execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Machine-readable error kind (see [`crate::Error::kind`])
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

/// In-memory, append-only store for a single session.
#[derive(Debug, Default)]
pub struct SessionStore {
    conversation: Conversation,
    notice: Option<Notice>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full transcript, oldest turn first.
    pub fn turns(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Append one turn. Clears any notice from the previous execution.
    pub fn append(&mut self, turn: Message) {
        self.notice = None;
        self.conversation.push(turn);
    }

    /// Append the turns an execution produced, in order.
    pub fn append_all(&mut self, turns: impl IntoIterator<Item = Message>) {
        self.conversation.extend(turns);
    }

    /// Record an execution failure to show alongside the transcript.
    pub fn set_notice(&mut self, error: &crate::Error) {
        self.notice = Some(Notice {
            kind: error.kind().to_string(),
            message: error.to_string(),
        });
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Drop the transcript and start a fresh conversation.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
