//! Configuration loading, validation, and management for RouteChat.
//!
//! Loads configuration from `~/.routechat/config.toml` with environment
//! variable overrides. Validates all settings at startup so a bad model
//! name fails before the first message, not during it.

pub mod models;

pub use models::ModelId;

use routechat_core::Mode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.routechat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Credential for the completion endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible completion endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier, one of [`ModelId::ALL`]
    #[serde(default = "default_model")]
    pub model: String,

    /// Mode selected when a session starts
    #[serde(default = "default_mode")]
    pub mode: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Cap on model → tool → model rounds within one turn
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: u32,

    /// Lookup tool configuration
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Web page server configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_model() -> String {
    ModelId::default().as_str().into()
}
fn default_mode() -> String {
    Mode::default().as_str().into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tool_iterations() -> u32 {
    8
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("mode", &self.mode)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .field("tools", &self.tools)
            .field("gateway", &self.gateway)
            .finish()
    }
}

/// Which service answers the `web_search` tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebSearchBackend {
    /// DuckDuckGo HTML results, no credential needed
    #[default]
    DuckDuckGo,
    /// Tavily search API, needs `search_api_key`
    Tavily,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Results fetched per lookup
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Maximum characters of text a knowledge-base lookup returns
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    #[serde(default)]
    pub web_search_backend: WebSearchBackend,

    /// Credential for search backends that need one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_api_key: Option<String>,

    #[serde(default = "default_wikipedia_url")]
    pub wikipedia_url: String,

    #[serde(default = "default_arxiv_url")]
    pub arxiv_url: String,

    #[serde(default = "default_duckduckgo_url")]
    pub duckduckgo_url: String,

    #[serde(default = "default_tavily_url")]
    pub tavily_url: String,
}

fn default_top_k() -> usize {
    3
}
fn default_max_chars() -> usize {
    1000
}
fn default_wikipedia_url() -> String {
    "https://en.wikipedia.org/w/api.php".into()
}
fn default_arxiv_url() -> String {
    "https://export.arxiv.org/api/query".into()
}
fn default_duckduckgo_url() -> String {
    "https://html.duckduckgo.com/html/".into()
}
fn default_tavily_url() -> String {
    "https://api.tavily.com/search".into()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_chars: default_max_chars(),
            web_search_backend: WebSearchBackend::default(),
            search_api_key: None,
            wikipedia_url: default_wikipedia_url(),
            arxiv_url: default_arxiv_url(),
            duckduckgo_url: default_duckduckgo_url(),
            tavily_url: default_tavily_url(),
        }
    }
}

impl std::fmt::Debug for ToolsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolsConfig")
            .field("top_k", &self.top_k)
            .field("max_chars", &self.max_chars)
            .field("web_search_backend", &self.web_search_backend)
            .field("search_api_key", &redact(&self.search_api_key))
            .field("wikipedia_url", &self.wikipedia_url)
            .field("arxiv_url", &self.arxiv_url)
            .field("duckduckgo_url", &self.duckduckgo_url)
            .field("tavily_url", &self.tavily_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8501
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// The settings a user can change from the settings panel.
///
/// Fixed for the duration of one graph execution; a change applies from the
/// next submitted message onward.
#[derive(Clone, PartialEq)]
pub struct SessionSettings {
    pub api_key: Option<String>,
    pub model: ModelId,
    pub mode: Mode,
}

impl std::fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSettings")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("mode", &self.mode)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.routechat/config.toml).
    ///
    /// Environment variables override the file:
    /// - `ROUTECHAT_API_KEY`, then `GROQ_API_KEY` (completion credential)
    /// - `TAVILY_API_KEY` (search credential)
    /// - `ROUTECHAT_MODEL`, `ROUTECHAT_MODE`, `ROUTECHAT_BASE_URL`
    ///
    /// Call [`load_dotenv`] first to let a `.env` file supply them.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with(&config_path, |key| std::env::var(key).ok())
    }

    /// Read `path`, apply overrides from `lookup`, then validate the result.
    pub fn load_with(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Read a config file without validating it.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = non_empty("ROUTECHAT_API_KEY").or_else(|| non_empty("GROQ_API_KEY"));
        }
        if self.tools.search_api_key.is_none() {
            self.tools.search_api_key = non_empty("TAVILY_API_KEY");
        }
        if let Some(model) = non_empty("ROUTECHAT_MODEL") {
            self.model = model;
        }
        if let Some(mode) = non_empty("ROUTECHAT_MODE") {
            self.mode = mode;
        }
        if let Some(url) = non_empty("ROUTECHAT_BASE_URL") {
            self.base_url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".routechat")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model_id()?;

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_tool_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "max_tool_iterations must be at least 1".into(),
            ));
        }

        if self.tools.top_k == 0 || self.tools.top_k > 10 {
            return Err(ConfigError::ValidationError(
                "tools.top_k must be between 1 and 10".into(),
            ));
        }

        if self.tools.max_chars == 0 {
            return Err(ConfigError::ValidationError(
                "tools.max_chars must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// The configured model, checked against the supported set.
    pub fn model_id(&self) -> Result<ModelId, ConfigError> {
        self.model.parse()
    }

    /// Settings a new session starts with.
    pub fn session_settings(&self) -> Result<SessionSettings, ConfigError> {
        Ok(SessionSettings {
            api_key: self.api_key.clone(),
            model: self.model_id()?,
            mode: Mode::parse_lossy(&self.mode),
        })
    }

    /// Check if a completion credential is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            mode: default_mode(),
            temperature: default_temperature(),
            max_tokens: None,
            max_tool_iterations: default_max_tool_iterations(),
            tools: ToolsConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Load a `.env` file from the working directory (or a parent) into the
/// process environment. Variables that are already set keep their values.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable .env file");
            None
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Unsupported model '{model}'; choose one of: {supported}")]
    UnsupportedModel { model: String, supported: String },
}
