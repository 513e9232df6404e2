//! # RouteChat Graph
//!
//! The routing graph that answers each submitted message. The selected mode
//! picks one of three strategies:
//!
//! ```text
//! Start → Route ─┬─ normal ──→ PlainReply ──────────────→ End
//!                ├─ news ────→ NewsReply ───────────────→ End
//!                └─ tools ───→ ToolReply ⇄ ToolExec ────→ End
//! ```
//!
//! - **PlainReply**: one completion over the transcript.
//! - **NewsReply**: a web search for the conversation's opening question,
//!   returned verbatim.
//! - **ToolReply / ToolExec**: completion with the Wikipedia and arXiv tools,
//!   looping until the model answers in text or the round limit is hit.

pub mod executor;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use executor::{DEFAULT_MAX_TOOL_ITERATIONS, Execution, RoutingGraph, TOOL_LIMIT_NOTICE};
pub use state::{Branch, GraphState, route};
