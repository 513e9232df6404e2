//! arXiv lookup via the public Atom query API.

use async_trait::async_trait;
use routechat_core::error::ToolError;
use routechat_core::tool::Tool;
use tracing::debug;

use crate::text::{collapse_whitespace, decode_entities, pattern, truncate_chars};

pub const NO_RESULT: &str = "No good Arxiv Result was found";

/// The API rejects very long queries.
const MAX_QUERY_CHARS: usize = 300;

pub struct ArxivTool {
    client: reqwest::Client,
    endpoint: String,
    top_k: usize,
    max_chars: usize,
}

impl ArxivTool {
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

    /// Render the entries of an Atom feed as text blocks.
    fn render_feed(&self, feed: &str) -> Result<Vec<String>, ToolError> {
        let entry_re = pattern(self.name(), r"(?s)<entry>(.*?)</entry>")?;
        let author_re = pattern(self.name(), r"(?s)<author>\s*<name>(.*?)</name>")?;
        let field = |tag: &str, entry: &str| -> Result<String, ToolError> {
            let re = pattern(self.name(), &format!(r"(?s)<{tag}[^>]*>(.*?)</{tag}>"))?;
            Ok(re
                .captures(entry)
                .and_then(|c| c.get(1))
                .map(|m| collapse_whitespace(&decode_entities(m.as_str())))
                .unwrap_or_default())
        };

        let mut blocks = Vec::new();
        for cap in entry_re.captures_iter(feed).take(self.top_k) {
            let entry = cap.get(1).map_or("", |m| m.as_str());
            let published = field("published", entry)?;
            let authors: Vec<String> = author_re
                .captures_iter(entry)
                .filter_map(|c| c.get(1))
                .map(|m| collapse_whitespace(&decode_entities(m.as_str())))
                .collect();

            blocks.push(format!(
                "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
                published.get(..10).unwrap_or(published.as_str()),
                field("title", entry)?,
                authors.join(", "),
                field("summary", entry)?,
            ));
        }
        Ok(blocks)
    }
}

#[async_trait]
impl Tool for ArxivTool {
    fn name(&self) -> &str {
        "arxiv"
    }

    fn description(&self) -> &str {
        "Search arXiv for scientific papers. Input is a search query; \
         returns publication date, title, authors and abstract of the top papers."
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        let cleaned = query.replace([':', '-'], " ");
        let cleaned = truncate_chars(cleaned.trim(), MAX_QUERY_CHARS);
        debug!(query = %cleaned, "Querying arXiv");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("search_query", format!("all:{cleaned}")),
                ("start", "0".to_string()),
                ("max_results", self.top_k.to_string()),
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

        let feed = response
            .text()
            .await
            .map_err(|e| ToolError::failed(self.name(), e))?;

        let blocks = self.render_feed(&feed)?;
        if blocks.is_empty() {
            return Ok(NO_RESULT.to_string());
        }
        Ok(truncate_chars(&blocks.join("\n\n"), self.max_chars))
    }
}
