//! Language-model access for RouteChat.
//!
//! [`OpenAiCompatProvider`] speaks the OpenAI chat-completions protocol
//! (Groq by default). [`CompletionClient`] wraps any provider behind the two
//! contracts the routing graph needs: a plain completion and a tool-aware
//! completion whose reply is either text or tool requests.

pub mod completion;
pub mod openai_compat;

pub use completion::{CompletionClient, Reply, ToolInvocationRequest};
pub use openai_compat::OpenAiCompatProvider;
