//! Conversation modes.
//!
//! The mode is picked by the user once per submitted message and decides
//! which strategy answers it. Free-text input never fails to parse: anything
//! that is not `news` or `tools` is treated as `normal`.

use serde::{Deserialize, Serialize};

/// The user-selected conversation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Plain language-model reply
    #[default]
    Normal,
    /// Web search on the opening question, returned verbatim
    News,
    /// Language model with the knowledge-base tools
    Tools,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Normal, Mode::News, Mode::Tools];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::News => "news",
            Mode::Tools => "tools",
        }
    }

    /// Parse a mode selector, degrading unrecognized values to `Normal`.
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "news" => Mode::News,
            "tools" => Mode::Tools,
            "normal" => Mode::Normal,
            other => {
                tracing::debug!(mode = %other, "Unrecognized mode, using normal");
                Mode::Normal
            }
        }
    }
}

impl From<&str> for Mode {
    fn from(value: &str) -> Self {
        Self::parse_lossy(value)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
