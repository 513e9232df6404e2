//! Shared test helpers: a scripted provider and scripted tools.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use routechat_config::ModelId;
use routechat_core::error::{ProviderError, ToolError};
use routechat_core::event::EventBus;
use routechat_core::message::{Message, MessageToolCall};
use routechat_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use routechat_core::tool::{Tool, ToolRegistry};
use routechat_providers::CompletionClient;
use routechat_tools::ToolAdapter;

use crate::RoutingGraph;

enum Script {
    Sequence(Vec<ProviderResponse>),
    Repeat(ProviderResponse),
    Fail,
}

/// A provider that replays scripted responses and records every request.
pub struct ScriptedProvider {
    script: Script,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn with_script(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn new(responses: Vec<ProviderResponse>) -> Arc<Self> {
        Self::with_script(Script::Sequence(responses))
    }

    /// Returns the same response on every call.
    pub fn repeating(response: ProviderResponse) -> Arc<Self> {
        Self::with_script(Script::Repeat(response))
    }

    /// Fails every call.
    pub fn failing() -> Arc<Self> {
        Self::with_script(Script::Fail)
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let call = requests.len();
        requests.push(request);

        match &self.script {
            Script::Sequence(responses) => match responses.get(call) {
                Some(response) => Ok(response.clone()),
                None => panic!("ScriptedProvider: no response for call #{call}"),
            },
            Script::Repeat(response) => Ok(response.clone()),
            Script::Fail => Err(ProviderError::ApiError {
                status_code: 500,
                message: "scripted failure".into(),
            }),
        }
    }
}

/// Scripted stand-ins for `wikipedia`, `arxiv` and `web_search`.
///
/// Every invocation is recorded. Output is `"<tool> result for <query>"`.
#[derive(Clone, Default)]
pub struct ScriptedTools {
    calls: Arc<Mutex<Vec<(String, String)>>>,
    fail_at: Option<usize>,
}

impl ScriptedTools {
    /// Make the `nth` invocation (1-based, across all tools) fail.
    pub fn failing_at(mut self, nth: usize) -> Self {
        self.fail_at = Some(nth);
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn adapter(&self) -> ToolAdapter {
        let mut registry = ToolRegistry::new();
        for name in ["wikipedia", "arxiv", "web_search"] {
            registry.register(Box::new(ScriptedTool {
                name,
                shared: self.clone(),
            }));
        }
        ToolAdapter::new(registry)
    }
}

struct ScriptedTool {
    name: &'static str,
    shared: ScriptedTools,
}

#[async_trait]
impl Tool for ScriptedTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "scripted tool"
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        let mut calls = self.shared.calls.lock().unwrap();
        calls.push((self.name.to_string(), query.to_string()));
        if self.shared.fail_at == Some(calls.len()) {
            return Err(ToolError::failed(self.name, "scripted failure"));
        }
        Ok(format!("{} result for {query}", self.name))
    }
}

/// Build a graph over scripted collaborators.
pub fn graph_with(
    provider: Arc<ScriptedProvider>,
    tools: ScriptedTools,
) -> (RoutingGraph, Arc<EventBus>) {
    let events = Arc::new(EventBus::default());
    let completion = CompletionClient::new(provider, ModelId::default());
    let graph = RoutingGraph::new(completion, Arc::new(tools.adapter()), events.clone());
    (graph, events)
}

pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "scripted-model".into(),
    }
}

/// A response requesting `(tool, query)` calls, in order.
pub fn tool_call_response(calls: &[(&str, &str)]) -> ProviderResponse {
    let mut message = Message::assistant("");
    message.tool_calls = calls
        .iter()
        .enumerate()
        .map(|(i, (name, query))| MessageToolCall {
            id: format!("call_{i}_{name}"),
            name: name.to_string(),
            arguments: serde_json::json!({ "query": query }).to_string(),
        })
        .collect();
    ProviderResponse {
        message,
        usage: None,
        model: "scripted-model".into(),
    }
}
