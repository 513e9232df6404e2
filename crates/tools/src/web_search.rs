//! Web search tool.
//!
//! Two backends:
//! - DuckDuckGo's HTML endpoint (no credential), snippets scraped from the
//!   result page
//! - Tavily's JSON search API, which needs a search credential

use async_trait::async_trait;
use routechat_core::error::ToolError;
use routechat_core::tool::Tool;
use serde::Deserialize;
use tracing::debug;

use crate::text::{pattern, strip_html, truncate_chars};

pub const NO_DUCKDUCKGO_RESULT: &str = "No good DuckDuckGo Search Result was found";
pub const NO_TAVILY_RESULT: &str = "No good Tavily Search Result was found";

/// Which search service answers queries.
#[derive(Debug, Clone)]
pub enum SearchBackend {
    DuckDuckGo { endpoint: String },
    Tavily { endpoint: String, api_key: Option<String> },
}

pub struct WebSearchTool {
    client: reqwest::Client,
    backend: SearchBackend,
    max_results: usize,
    max_chars: usize,
}

impl WebSearchTool {
    pub fn new(client: reqwest::Client, backend: SearchBackend) -> Self {
        Self {
            client,
            backend,
            max_results: 3,
            max_chars: 1000,
        }
    }

    pub fn with_limits(mut self, max_results: usize, max_chars: usize) -> Self {
        self.max_results = max_results;
        self.max_chars = max_chars;
        self
    }

    async fn search_duckduckgo(&self, endpoint: &str, query: &str) -> Result<String, ToolError> {
        let response = self
            .client
            .post(endpoint)
            .form(&[("q", query)])
            .send()
            .await
            .map_err(|e| ToolError::failed(self.name(), e))?;

        if !response.status().is_success() {
            return Err(ToolError::failed(
                self.name(),
                format!("HTTP {}", response.status()),
            ));
        }

        let page = response
            .text()
            .await
            .map_err(|e| ToolError::failed(self.name(), e))?;

        let snippet_re = pattern(
            self.name(),
            r#"(?s)<a[^>]*class="result__snippet"[^>]*>(.*?)</a>"#,
        )?;
        let snippets: Vec<String> = snippet_re
            .captures_iter(&page)
            .filter_map(|c| c.get(1))
            .map(|m| strip_html(m.as_str()).trim().to_string())
            .filter(|s| !s.is_empty())
            .take(self.max_results)
            .collect();

        if snippets.is_empty() {
            return Ok(NO_DUCKDUCKGO_RESULT.to_string());
        }
        Ok(snippets.join(" "))
    }

    async fn search_tavily(
        &self,
        endpoint: &str,
        api_key: Option<&str>,
        query: &str,
    ) -> Result<String, ToolError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ToolError::failed(self.name(), "no search API key configured"))?;

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "query": query,
                "max_results": self.max_results,
            }))
            .send()
            .await
            .map_err(|e| ToolError::failed(self.name(), e))?;

        if !response.status().is_success() {
            return Err(ToolError::failed(
                self.name(),
                format!("HTTP {}", response.status()),
            ));
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| ToolError::failed(self.name(), format!("bad response: {e}")))?;

        if body.results.is_empty() {
            return Ok(NO_TAVILY_RESULT.to_string());
        }

        let blocks: Vec<String> = body
            .results
            .into_iter()
            .take(self.max_results)
            .map(|r| format!("{}\n{}\n{}", r.title, r.url, r.content.trim()))
            .collect();
        Ok(truncate_chars(&blocks.join("\n\n"), self.max_chars))
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information and news. Input is a search query."
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        match &self.backend {
            SearchBackend::DuckDuckGo { endpoint } => {
                debug!(query, backend = "duckduckgo", "Searching the web");
                self.search_duckduckgo(endpoint, query).await
            }
            SearchBackend::Tavily { endpoint, api_key } => {
                debug!(query, backend = "tavily", "Searching the web");
                self.search_tavily(endpoint, api_key.as_deref(), query).await
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}
