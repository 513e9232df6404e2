//! Channel trait: the abstraction over line-oriented user surfaces.
//!
//! A Channel yields one user line at a time and prints replies back. The
//! terminal REPL is the implementation; the web page talks to the gateway
//! over HTTP instead.

use crate::error::ChannelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A line received from a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Sender identifier
    pub sender_id: String,

    /// The text content, trimmed
    pub content: String,
}

/// The core Channel trait.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "cli").
    fn name(&self) -> &str;

    /// Start listening for incoming lines.
    ///
    /// The receiver closes when the user ends the session.
    async fn start(
        &self,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError>;

    /// Deliver text to the user.
    async fn send(&self, content: &str) -> Result<(), ChannelError>;
}
