//! Lookup tools for RouteChat.
//!
//! Every tool takes a text query and returns text:
//! - `wikipedia`: general knowledge, page summaries
//! - `arxiv`: scientific papers
//! - `web_search`: current web results, used by news mode
//!
//! [`ToolAdapter`] resolves names against the fixed registry and
//! [`ToolCatalog`] restricts what the model may call.

pub mod adapter;
pub mod arxiv;
pub mod text;
pub mod web_search;
pub mod wikipedia;

pub use adapter::{Invocation, KNOWLEDGE_TOOLS, ToolAdapter, ToolCatalog};
pub use arxiv::ArxivTool;
pub use web_search::{SearchBackend, WebSearchTool};
pub use wikipedia::WikipediaTool;
