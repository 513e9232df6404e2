//! The tool adapter: one entry point for every lookup the assistant makes.
//!
//! The adapter owns a fixed [`ToolRegistry`]. A [`ToolCatalog`] narrows it
//! to the subset the model may call, and calls outside that subset are
//! refused before anything leaves the process.

use std::time::{Duration, Instant};

use routechat_config::{ToolsConfig, WebSearchBackend};
use routechat_core::error::ToolError;
use routechat_core::provider::ToolDefinition;
use routechat_core::tool::{Tool, ToolRegistry};
use tracing::{debug, warn};

use crate::arxiv::ArxivTool;
use crate::web_search::{SearchBackend, WebSearchTool};
use crate::wikipedia::WikipediaTool;

/// Timeout for a single lookup request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Names of the tools offered to the model in tool mode.
pub const KNOWLEDGE_TOOLS: [&str; 2] = ["wikipedia", "arxiv"];

/// The tools a completion may request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCatalog {
    names: Vec<String>,
}

impl ToolCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The knowledge-base tools: Wikipedia and arXiv.
    pub fn knowledge() -> Self {
        Self::new(KNOWLEDGE_TOOLS)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Outcome of one invocation, with the timing the graph reports.
#[derive(Debug)]
pub struct Invocation {
    pub result: Result<String, ToolError>,
    pub duration_ms: u64,
}

/// Resolves tool names and runs them.
pub struct ToolAdapter {
    registry: ToolRegistry,
}

impl ToolAdapter {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Build the standard registry (`wikipedia`, `arxiv`, `web_search`)
    /// from the `[tools]` config section.
    pub fn from_config(config: &ToolsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("routechat/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let backend = match config.web_search_backend {
            WebSearchBackend::DuckDuckGo => SearchBackend::DuckDuckGo {
                endpoint: config.duckduckgo_url.clone(),
            },
            WebSearchBackend::Tavily => SearchBackend::Tavily {
                endpoint: config.tavily_url.clone(),
                api_key: config.search_api_key.clone(),
            },
        };

        let mut registry = ToolRegistry::new();
        registry.register(Box::new(
            WikipediaTool::new(client.clone(), config.wikipedia_url.clone())
                .with_limits(config.top_k, config.max_chars),
        ));
        registry.register(Box::new(
            ArxivTool::new(client.clone(), config.arxiv_url.clone())
                .with_limits(config.top_k, config.max_chars),
        ));
        registry.register(Box::new(
            WebSearchTool::new(client, backend).with_limits(config.top_k, config.max_chars),
        ));
        Self::new(registry)
    }

    /// Names of every registered tool.
    pub fn names(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Run the named tool with a text query.
    pub async fn invoke(&self, name: &str, query: &str) -> Result<String, ToolError> {
        let tool = self.registry.resolve(name)?;
        debug!(tool = name, "Invoking tool");
        let result = tool.invoke(query).await;
        if let Err(e) = &result {
            warn!(tool = name, error = %e, "Tool invocation failed");
        }
        result
    }

    /// Run a model-requested call, restricted to `catalog`.
    ///
    /// The call's arguments must be a JSON object with a string `query`.
    pub async fn invoke_in(
        &self,
        catalog: &ToolCatalog,
        name: &str,
        arguments: &serde_json::Value,
    ) -> Invocation {
        let start = Instant::now();
        let result = match Self::catalog_query(catalog, name, arguments) {
            Ok(query) => self.invoke(name, query).await,
            Err(e) => {
                warn!(tool = name, error = %e, "Rejected tool call");
                Err(e)
            }
        };
        Invocation {
            result,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Definitions for the catalog's tools, in catalog order.
    pub fn definitions(&self, catalog: &ToolCatalog) -> Vec<ToolDefinition> {
        catalog
            .names()
            .iter()
            .filter_map(|n| self.registry.get(n))
            .map(|t| t.to_definition())
            .collect()
    }

    fn catalog_query<'a>(
        catalog: &ToolCatalog,
        name: &str,
        arguments: &'a serde_json::Value,
    ) -> Result<&'a str, ToolError> {
        if !catalog.contains(name) {
            return Err(ToolError::UnknownTool(name.to_string()));
        }
        arguments
            .get("query")
            .and_then(|q| q.as_str())
            .ok_or_else(|| ToolError::failed(name, "missing string argument 'query'"))
    }
}

impl std::fmt::Debug for ToolAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolAdapter")
            .field("tools", &self.registry.names())
            .finish()
    }
}
