//! Wikipedia lookup via the MediaWiki action API.
//!
//! One request per query: a search generator with intro extracts, so the
//! top pages come back with their summaries already attached.

use async_trait::async_trait;
use routechat_core::error::ToolError;
use routechat_core::tool::Tool;
use serde::Deserialize;
use tracing::debug;

use crate::text::truncate_chars;

pub const NO_RESULT: &str = "No good Wikipedia Search Result was found";

pub struct WikipediaTool {
    client: reqwest::Client,
    endpoint: String,
    top_k: usize,
    max_chars: usize,
}

impl WikipediaTool {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            top_k: 3,
            max_chars: 1000,
        }
    }

    pub fn with_limits(mut self, top_k: usize, max_chars: usize) -> Self {
        self.top_k = top_k;
        self.max_chars = max_chars;
        self
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Look up general knowledge on Wikipedia. Input is a search query; \
         returns the titles and summaries of the best matching pages."
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        let limit = self.top_k.to_string();
        debug!(query, "Querying Wikipedia");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", limit.as_str()),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exlimit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ToolError::failed(self.name(), e))?;

        if !response.status().is_success() {
            return Err(ToolError::failed(
                self.name(),
                format!("HTTP {}", response.status()),
            ));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ToolError::failed(self.name(), format!("bad response: {e}")))?;

        let mut pages = body.query.map(|q| q.pages).unwrap_or_default();
        if pages.is_empty() {
            return Ok(NO_RESULT.to_string());
        }
        pages.sort_by_key(|p| p.index);

        let summaries: Vec<String> = pages
            .into_iter()
            .take(self.top_k)
            .map(|p| format!("Page: {}\nSummary: {}", p.title, p.extract.trim()))
            .collect();

        Ok(truncate_chars(&summaries.join("\n\n"), self.max_chars))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    index: u32,
    #[serde(default)]
    extract: String,
}
