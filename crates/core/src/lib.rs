//! # RouteChat Core
//!
//! Domain types, traits, and error definitions for the RouteChat assistant.
//! This crate has no HTTP or UI dependencies. It defines the turn model,
//! the conversation modes, and the seams (providers, tools, channels) that
//! the other crates implement against.
//!
//! ## Design Philosophy
//!
//! External collaborators are traits here, implementations live in their
//! own crates:
//! - the language model is a [`Provider`]
//! - each lookup capability is a [`Tool`]
//! - each way of talking to a user is a [`Channel`]
//!
//! Tests swap any of them for scripted stubs.

pub mod channel;
pub mod error;
pub mod event;
pub mod message;
pub mod mode;
pub mod provider;
pub mod session;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use channel::{Channel, ChannelMessage};
pub use error::{ChannelError, Error, ProviderError, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use mode::Mode;
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use session::SessionStore;
pub use tool::{Tool, ToolRegistry};
