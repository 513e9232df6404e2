//! End-to-end properties of the routing graph, run against scripted
//! collaborators so no network is involved.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use routechat_config::ModelId;
use routechat_core::error::{Error, ProviderError, ToolError};
use routechat_core::event::EventBus;
use routechat_core::message::{Message, MessageToolCall, Role};
use routechat_core::mode::Mode;
use routechat_core::provider::{Provider, ProviderRequest, ProviderResponse};
use routechat_core::session::SessionStore;
use routechat_core::tool::{Tool, ToolRegistry};
use routechat_graph::{GraphState, RoutingGraph};
use routechat_providers::CompletionClient;
use routechat_tools::ToolAdapter;

// --- Scripted collaborators ---

struct Script {
    responses: Vec<ProviderResponse>,
    requests: Mutex<Vec<ProviderRequest>>,
}

#[async_trait]
impl Provider for Script {
    fn name(&self) -> &str {
        "script"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let n = requests.len();
        requests.push(request);
        Ok(self.responses[n].clone())
    }
}

#[derive(Default)]
struct Lookups {
    calls: Mutex<Vec<(String, String)>>,
    fail_at: Option<usize>,
}

struct Lookup {
    name: &'static str,
    shared: Arc<Lookups>,
}

#[async_trait]
impl Tool for Lookup {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "scripted lookup"
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        let mut calls = self.shared.calls.lock().unwrap();
        calls.push((self.name.into(), query.into()));
        if self.shared.fail_at == Some(calls.len()) {
            return Err(ToolError::failed(self.name, "upstream timed out"));
        }
        Ok(format!("[{}] {query}", self.name))
    }
}

struct Harness {
    graph: RoutingGraph,
    script: Arc<Script>,
    lookups: Arc<Lookups>,
}

impl Harness {
    fn new(responses: Vec<ProviderResponse>) -> Self {
        Self::with_lookups(responses, Lookups::default())
    }

    fn with_lookups(responses: Vec<ProviderResponse>, lookups: Lookups) -> Self {
        let script = Arc::new(Script {
            responses,
            requests: Mutex::new(vec![]),
        });
        let lookups = Arc::new(lookups);

        let mut registry = ToolRegistry::new();
        for name in ["wikipedia", "arxiv", "web_search"] {
            registry.register(Box::new(Lookup {
                name,
                shared: lookups.clone(),
            }));
        }

        let graph = RoutingGraph::new(
            CompletionClient::new(script.clone(), ModelId::default()),
            Arc::new(ToolAdapter::new(registry)),
            Arc::new(EventBus::default()),
        );
        Self {
            graph,
            script,
            lookups,
        }
    }

    fn completion_calls(&self) -> usize {
        self.script.requests.lock().unwrap().len()
    }

    fn lookups(&self) -> Vec<(String, String)> {
        self.lookups.calls.lock().unwrap().clone()
    }
}

fn text(content: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(content),
        usage: None,
        model: "script".into(),
    }
}

fn calls(requests: &[(&str, &str)]) -> ProviderResponse {
    let mut message = Message::assistant("");
    message.tool_calls = requests
        .iter()
        .enumerate()
        .map(|(i, (name, query))| MessageToolCall {
            id: format!("call_{i}"),
            name: name.to_string(),
            arguments: serde_json::json!({ "query": query }).to_string(),
        })
        .collect();
    ProviderResponse {
        message,
        usage: None,
        model: "script".into(),
    }
}

fn summary(turns: &[Message]) -> Vec<(Role, String)> {
    turns.iter().map(|t| (t.role, t.content.clone())).collect()
}

// --- Routing ---

#[tokio::test]
async fn every_mode_routes_to_its_branch() {
    let cases = [
        ("normal", GraphState::PlainReply),
        ("news", GraphState::NewsReply),
        ("tools", GraphState::ToolReply),
        ("weather", GraphState::PlainReply),
        ("", GraphState::PlainReply),
    ];

    for (selector, branch) in cases {
        let h = Harness::new(vec![text("ok")]);
        let exec = h
            .graph
            .execute(&[Message::user("hello")], Mode::parse_lossy(selector))
            .await;

        assert_eq!(exec.path[..3], [GraphState::Start, GraphState::Route, branch], "{selector:?}");
        assert_eq!(exec.path.last(), Some(&GraphState::End));
        assert!(exec.is_success(), "{selector:?}");
    }
}

#[tokio::test]
async fn plain_reply_uses_whole_history_without_tools() {
    let h = Harness::new(vec![text("Paris.")]);
    let history = [
        Message::user("hi"),
        Message::assistant("hello"),
        Message::user("capital of France?"),
    ];

    let exec = h.graph.execute(&history, Mode::Normal).await;
    assert_eq!(exec.reply.unwrap().content, "Paris.");
    assert!(exec.tool_turns.is_empty());

    let requests = h.script.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(summary(&requests[0].messages), summary(&history));
    assert!(requests[0].tools.is_empty());
    assert!(h.lookups().is_empty());
}

// --- News ---

#[tokio::test]
async fn news_searches_first_turn_and_replies_verbatim() {
    let h = Harness::new(vec![]);
    let history = [
        Message::user("rust 2024 edition"),
        Message::assistant("[web_search] rust 2024 edition"),
        Message::user("anything newer?"),
    ];

    let exec = h.graph.execute(&history, Mode::News).await;

    assert_eq!(h.lookups(), [("web_search".to_string(), "rust 2024 edition".to_string())]);
    assert_eq!(exec.reply.unwrap().content, "[web_search] rust 2024 edition");
    assert!(exec.tool_turns.is_empty());
    assert_eq!(h.completion_calls(), 0);
}

// --- Tool loop ---

#[tokio::test]
async fn three_tool_rounds_then_text() {
    let h = Harness::new(vec![
        calls(&[("wikipedia", "transformer")]),
        calls(&[("arxiv", "attention is all you need")]),
        calls(&[("wikipedia", "Ashish Vaswani")]),
        text("It was introduced in 2017."),
    ]);
    let mut store = SessionStore::new();

    let exec = h.graph.submit(&mut store, "When were transformers introduced?", Mode::Tools).await;
    assert!(exec.is_success());
    assert_eq!(h.completion_calls(), 4);

    let roles: Vec<_> = store.turns().iter().map(|t| t.role).collect();
    assert_eq!(roles, [Role::User, Role::Tool, Role::Tool, Role::Tool, Role::Assistant]);
    assert_eq!(store.turns()[2].content, "[arxiv] attention is all you need");
    assert_eq!(store.turns()[4].content, "It was introduced in 2017.");

    // Each completion sees the full prefix accumulated so far.
    let requests = h.script.requests.lock().unwrap();
    for (i, request) in requests.iter().enumerate() {
        assert_eq!(summary(&request.messages), summary(&store.turns()[..1 + i]));
        let offered: Vec<_> = request.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(offered, ["wikipedia", "arxiv"]);
    }
}

#[tokio::test]
async fn multiple_requests_run_in_model_order() {
    let h = Harness::new(vec![
        calls(&[("arxiv", "b"), ("wikipedia", "a")]),
        text("done"),
    ]);

    let exec = h.graph.execute(&[Message::user("q")], Mode::Tools).await;
    assert_eq!(
        h.lookups(),
        [
            ("arxiv".to_string(), "b".to_string()),
            ("wikipedia".to_string(), "a".to_string())
        ]
    );
    let answered: Vec<_> = exec.tool_turns.iter().map(|t| t.tool_call_id().unwrap()).collect();
    assert_eq!(answered, ["call_0", "call_1"]);
}

#[tokio::test]
async fn replaying_the_same_scripts_gives_the_same_turns() {
    let script = || {
        vec![
            calls(&[("wikipedia", "rust"), ("arxiv", "borrow checker")]),
            text("Rust is memory safe."),
        ]
    };
    let history = [Message::user("tell me about rust")];

    let first = Harness::new(script()).graph.execute(&history, Mode::Tools).await;
    let second = Harness::new(script()).graph.execute(&history, Mode::Tools).await;

    assert_eq!(first.path, second.path);
    assert_eq!(summary(&first.new_turns()), summary(&second.new_turns()));
}

// --- Failures ---

#[tokio::test]
async fn failure_on_second_of_three_invocations() {
    let h = Harness::with_lookups(
        vec![calls(&[("wikipedia", "a"), ("arxiv", "b"), ("wikipedia", "c")])],
        Lookups {
            fail_at: Some(2),
            ..Default::default()
        },
    );
    let mut store = SessionStore::new();
    store.append(Message::user("earlier question"));
    store.append_all([Message::assistant("earlier answer")]);
    let before = summary(store.turns());

    let exec = h.graph.submit(&mut store, "new question", Mode::Tools).await;

    let err = exec.reply.unwrap_err();
    assert!(matches!(
        err,
        Error::Tool(ToolError::InvocationFailed { ref tool_name, .. }) if tool_name == "arxiv"
    ));
    assert_eq!(h.lookups().len(), 2, "third request must not run");
    assert_eq!(exec.tool_turns.len(), 1);

    let turns = store.turns();
    assert_eq!(summary(&turns[..2]), before);
    let roles: Vec<_> = turns.iter().map(|t| t.role).collect();
    assert_eq!(roles, [Role::User, Role::Assistant, Role::User, Role::Tool]);
    assert_eq!(store.notice().unwrap().kind, "tool_invocation_failed");
}

#[tokio::test]
async fn unknown_tool_fails_without_any_lookup() {
    for name in ["calculator", "web_search"] {
        let h = Harness::new(vec![calls(&[(name, "2+2")])]);
        let exec = h.graph.execute(&[Message::user("q")], Mode::Tools).await;

        assert!(matches!(
            exec.reply,
            Err(Error::Tool(ToolError::UnknownTool(ref n))) if n == name
        ));
        assert!(h.lookups().is_empty(), "{name} must not reach any tool");
        assert!(exec.tool_turns.is_empty());
    }
}
