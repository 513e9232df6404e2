//! Completion client used by the routing graph.
//!
//! Wraps a [`Provider`] with the session's fixed model and sampling settings
//! and turns raw provider responses into a [`Reply`].

use std::sync::Arc;

use routechat_config::{AppConfig, ModelId, SessionSettings};
use routechat_core::error::Error;
use routechat_core::message::{Message, MessageToolCall};
use routechat_core::provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::openai_compat::OpenAiCompatProvider;

/// A tool call the model asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolInvocationRequest {
    /// The call as recorded on the tool-result turn that answers it.
    pub fn to_call(&self) -> MessageToolCall {
        MessageToolCall {
            id: self.id.clone(),
            name: self.name.clone(),
            arguments: self.arguments.to_string(),
        }
    }
}

impl From<MessageToolCall> for ToolInvocationRequest {
    fn from(call: MessageToolCall) -> Self {
        let arguments = serde_json::from_str(&call.arguments).unwrap_or_else(|e| {
            warn!(tool = %call.name, error = %e, "Model sent unparseable tool arguments");
            serde_json::Value::Null
        });
        Self {
            id: call.id,
            name: call.name,
            arguments,
        }
    }
}

/// What a tool-enabled completion produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A final answer.
    Text(String),
    /// One or more tool calls, in the order the model listed them.
    ToolRequests(Vec<ToolInvocationRequest>),
}

/// Completion client bound to one model and credential.
#[derive(Clone)]
pub struct CompletionClient {
    provider: Arc<dyn Provider>,
    model: ModelId,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn Provider>, model: ModelId) -> Self {
        Self {
            provider,
            model,
            temperature: 0.7,
            max_tokens: None,
        }
    }

    /// Build the client for a session: the credential and model come from
    /// the session settings, the endpoint and sampling from the config.
    pub fn from_settings(settings: &SessionSettings, config: &AppConfig) -> Self {
        let provider = OpenAiCompatProvider::new(
            "groq",
            config.base_url.clone(),
            settings.api_key.clone().unwrap_or_default(),
        );
        Self::new(Arc::new(provider), settings.model)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Plain completion over the history, no tools offered.
    pub async fn complete(&self, history: &[Message]) -> Result<String, Error> {
        let response = self.provider.complete(self.request(history, &[])).await?;
        log_usage(&response);
        Ok(response.message.content)
    }

    /// Completion with tools offered. The reply shape follows the model
    /// output: any tool call makes it a [`Reply::ToolRequests`].
    pub async fn complete_with_tools(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Reply, Error> {
        let response = self.provider.complete(self.request(history, tools)).await?;
        log_usage(&response);
        let message = response.message;

        if message.tool_calls.is_empty() {
            return Ok(Reply::Text(message.content));
        }

        debug!(
            model = %self.model,
            calls = message.tool_calls.len(),
            "Model requested tools"
        );
        Ok(Reply::ToolRequests(
            message
                .tool_calls
                .into_iter()
                .map(ToolInvocationRequest::from)
                .collect(),
        ))
    }

    fn request(&self, history: &[Message], tools: &[ToolDefinition]) -> ProviderRequest {
        ProviderRequest {
            model: self.model.as_str().to_string(),
            messages: history.to_vec(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: tools.to_vec(),
        }
    }
}

fn log_usage(response: &ProviderResponse) {
    if let Some(usage) = &response.usage {
        debug!(
            model = %response.model,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Completion usage"
        );
    }
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}
