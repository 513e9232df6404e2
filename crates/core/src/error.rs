//! Error types for the RouteChat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] wraps them.
//!
//! The three failures a turn can surface map onto these types:
//! - `UnknownTool` → [`ToolError::UnknownTool`]
//! - `ToolInvocationFailed` → [`ToolError::InvocationFailed`]
//! - `CompletionFailed` → [`Error::Completion`]

use thiserror::Error;

/// The top-level error type for all RouteChat operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Language model errors ---
    #[error("Completion failed: {0}")]
    Completion(#[from] ProviderError),

    // --- Tool errors ---
    #[error("{0}")]
    Tool(#[from] ToolError),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short machine-readable label, used in events and API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Completion(_) => "completion_failed",
            Error::Tool(ToolError::UnknownTool(_)) => "unknown_tool",
            Error::Tool(ToolError::InvocationFailed { .. }) => "tool_invocation_failed",
            Error::Internal(_) => "internal",
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),

    #[error("Message delivery failed: {0}")]
    DeliveryFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool invocation failed: {tool_name}: {reason}")]
    InvocationFailed { tool_name: String, reason: String },
}

impl ToolError {
    pub fn failed(tool_name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ToolError::InvocationFailed {
            tool_name: tool_name.into(),
            reason: reason.to_string(),
        }
    }
}
