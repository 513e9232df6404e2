//! OpenAI-compatible provider implementation.
//!
//! Works with Groq (the default endpoint), OpenAI, OpenRouter, Ollama, vLLM
//! and any other server exposing `/chat/completions`.
//!
//! Supports:
//! - Chat completions (non-streaming)
//! - Tool use / function calling
//! - Health checks

use async_trait::async_trait;
use routechat_core::error::ProviderError;
use routechat_core::message::{Message, MessageToolCall, Role};
use routechat_core::provider::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// An OpenAI-compatible chat provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Convert our Message types to OpenAI API format.
    ///
    /// A tool result must follow an assistant message that announced its
    /// call. Transcripts keep tool results but not the transient request
    /// messages, so unannounced results get a synthesized assistant message
    /// listing the calls they answer.
    ///
    /// A call counts as announced only by the latest assistant message, and
    /// only until a result answers it. Providers may reuse ids across turns.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        let mut out = Vec::with_capacity(messages.len());
        let mut open: HashSet<&str> = HashSet::new();
        let mut i = 0;

        while i < messages.len() {
            if is_unannounced(&messages[i], &open) {
                let run_end = messages[i..]
                    .iter()
                    .position(|m| !is_unannounced(m, &open))
                    .map_or(messages.len(), |p| i + p);
                let run = &messages[i..run_end];

                out.push(ApiMessage {
                    role: "assistant".into(),
                    content: None,
                    tool_calls: Some(
                        run.iter()
                            .filter_map(|m| m.in_reply_to.as_ref())
                            .map(ApiToolCall::from)
                            .collect(),
                    ),
                    tool_call_id: None,
                });
                out.extend(run.iter().map(ApiMessage::from));
                i = run_end;
                continue;
            }

            let m = &messages[i];
            match m.role {
                Role::Assistant => open = m.tool_calls.iter().map(|tc| tc.id.as_str()).collect(),
                Role::Tool => {
                    if let Some(id) = m.tool_call_id() {
                        open.remove(id);
                    }
                }
                Role::User | Role::System => open.clear(),
            }
            out.push(ApiMessage::from(m));
            i += 1;
        }

        out
    }

    /// Convert tool definitions to OpenAI API format.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::AuthenticationFailed(format!(
                "no API key configured for provider '{}'",
                self.name
            )));
        }

        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(5);
            return Err(ProviderError::RateLimited { retry_after_secs });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("No choices in response".into()))?;

        let tool_calls: Vec<MessageToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| MessageToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        let mut message = Message::assistant(choice.message.content.unwrap_or_default());
        message.tool_calls = tool_calls;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ProviderResponse {
            message,
            usage,
            model: api_response.model,
        })
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

/// A tool result whose call is not open from the latest assistant message.
fn is_unannounced(m: &Message, open: &HashSet<&str>) -> bool {
    m.role == Role::Tool && m.tool_call_id().is_some_and(|id| !open.contains(id))
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&Message> for ApiMessage {
    fn from(m: &Message) -> Self {
        ApiMessage {
            role: m.role.label().into(),
            content: Some(m.content.clone()),
            tool_calls: if m.tool_calls.is_empty() {
                None
            } else {
                Some(m.tool_calls.iter().map(ApiToolCall::from).collect())
            },
            tool_call_id: m.tool_call_id().map(String::from),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    r#type: String,
    function: ApiFunction,
}

impl From<&MessageToolCall> for ApiToolCall {
    fn from(tc: &MessageToolCall) -> Self {
        ApiToolCall {
            id: tc.id.clone(),
            r#type: "function".into(),
            function: ApiFunction {
                name: tc.name.clone(),
                arguments: tc.arguments.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
