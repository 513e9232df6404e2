//! The fixed set of chat models a session may select.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ConfigError;

/// A supported model identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModelId {
    #[default]
    Llama31_8bInstant,
    GptOss20b,
    DeepseekR1DistillLlama70b,
    Qwen3_32b,
}

impl ModelId {
    /// Every supported model, in the order the model selector lists them.
    pub const ALL: [ModelId; 4] = [
        ModelId::Llama31_8bInstant,
        ModelId::GptOss20b,
        ModelId::DeepseekR1DistillLlama70b,
        ModelId::Qwen3_32b,
    ];

    /// The identifier sent to the completion endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Llama31_8bInstant => "llama-3.1-8b-instant",
            ModelId::GptOss20b => "openai/gpt-oss-20b",
            ModelId::DeepseekR1DistillLlama70b => "deepseek-r1-distill-llama-70b",
            ModelId::Qwen3_32b => "qwen/qwen3-32b",
        }
    }

    pub fn supported() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.as_str()).collect()
    }
}

impl FromStr for ModelId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnsupportedModel {
                model: wanted.to_string(),
                supported: Self::supported().join(", "),
            })
    }
}

impl TryFrom<String> for ModelId {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModelId> for String {
    fn from(model: ModelId) -> Self {
        model.as_str().to_string()
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_supported_model() {
        for model in ModelId::ALL {
            assert_eq!(model.as_str().parse::<ModelId>().unwrap(), model);
        }
    }

    #[test]
    fn unsupported_model_lists_alternatives() {
        let err = "gpt-4o".parse::<ModelId>().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("gpt-4o"));
        assert!(text.contains("llama-3.1-8b-instant"));
    }

    #[test]
    fn serde_uses_wire_identifier() {
        let json = serde_json::to_string(&ModelId::Qwen3_32b).unwrap();
        assert_eq!(json, "\"qwen/qwen3-32b\"");
        assert!(serde_json::from_str::<ModelId>("\"mystery\"").is_err());
    }
}
