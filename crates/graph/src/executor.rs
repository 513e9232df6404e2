//! The routing graph executor.
//!
//! One execution answers one submitted message. It reads the transcript,
//! walks `Start → Route → <branch> → End`, and hands back the turns it
//! produced. The transcript itself is only touched by [`RoutingGraph::submit`],
//! after the walk is over.

use std::sync::Arc;

use chrono::Utc;
use routechat_config::{AppConfig, SessionSettings};
use routechat_core::error::Error;
use routechat_core::event::{DomainEvent, EventBus};
use routechat_core::message::Message;
use routechat_core::mode::Mode;
use routechat_core::session::SessionStore;
use routechat_providers::completion::{CompletionClient, Reply, ToolInvocationRequest};
use routechat_tools::{ToolAdapter, ToolCatalog};
use tracing::{debug, info, warn};

use crate::state::{GraphState, route};

/// Assistant turn used when the tool loop hits its round limit.
pub const TOOL_LIMIT_NOTICE: &str = "I've reached the maximum number of tool lookups for this \
                                     question without a final answer. Please try rephrasing it.";

/// Default number of tool execution rounds per message.
pub const DEFAULT_MAX_TOOL_ITERATIONS: u32 = 8;

/// The result of one graph execution.
#[derive(Debug)]
pub struct Execution {
    /// States visited, in order, from `Start` to `End`.
    pub path: Vec<GraphState>,
    /// Tool-result turns produced before the reply (or the failure).
    pub tool_turns: Vec<Message>,
    /// The assistant turn, or the error that ended the execution.
    pub reply: Result<Message, Error>,
}

impl Execution {
    /// Every turn to append to the transcript, oldest first.
    pub fn new_turns(&self) -> Vec<Message> {
        let mut turns = self.tool_turns.clone();
        if let Ok(reply) = &self.reply {
            turns.push(reply.clone());
        }
        turns
    }

    pub fn is_success(&self) -> bool {
        self.reply.is_ok()
    }
}

enum Step {
    Goto(GraphState),
    Finish(Result<Message, Error>),
}

/// Mutable context of one walk through the graph.
struct Walk {
    history: Vec<Message>,
    tool_turns: Vec<Message>,
    pending: Vec<ToolInvocationRequest>,
    rounds: u32,
}

/// Routes a message to the strategy its mode selects.
pub struct RoutingGraph {
    completion: CompletionClient,
    tools: Arc<ToolAdapter>,
    catalog: ToolCatalog,
    max_tool_iterations: u32,
    events: Arc<EventBus>,
}

impl RoutingGraph {
    pub fn new(completion: CompletionClient, tools: Arc<ToolAdapter>, events: Arc<EventBus>) -> Self {
        Self {
            completion,
            tools,
            catalog: ToolCatalog::knowledge(),
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
            events,
        }
    }

    /// Build the graph for one session's settings.
    pub fn from_settings(
        settings: &SessionSettings,
        config: &AppConfig,
        tools: Arc<ToolAdapter>,
        events: Arc<EventBus>,
    ) -> Self {
        Self::new(CompletionClient::from_settings(settings, config), tools, events)
            .with_max_tool_iterations(config.max_tool_iterations)
    }

    /// Set the maximum number of tool execution rounds per message.
    pub fn with_max_tool_iterations(mut self, max: u32) -> Self {
        self.max_tool_iterations = max.max(1);
        self
    }

    pub fn completion(&self) -> &CompletionClient {
        &self.completion
    }

    /// Record the user's message, run the graph, and record what it produced.
    ///
    /// On failure the tool-result turns completed so far are kept and the
    /// error becomes the session's notice. No assistant turn is added.
    pub async fn submit(&self, store: &mut SessionStore, text: &str, mode: Mode) -> Execution {
        store.append(Message::user(text));
        let execution = self.execute(store.turns(), mode).await;

        store.append_all(execution.tool_turns.iter().cloned());
        match &execution.reply {
            Ok(reply) => store.append_all([reply.clone()]),
            Err(e) => store.set_notice(e),
        }
        execution
    }

    /// Run the graph over `history` (which ends with the user's message).
    pub async fn execute(&self, history: &[Message], mode: Mode) -> Execution {
        info!(
            mode = %mode,
            model = %self.completion.model(),
            turns = history.len(),
            "Executing routing graph"
        );

        let mut walk = Walk {
            history: history.to_vec(),
            tool_turns: Vec::new(),
            pending: Vec::new(),
            rounds: 0,
        };
        let mut path = vec![GraphState::Start];
        let mut state = GraphState::Start;

        let reply = loop {
            match self.step(state, mode, &mut walk).await {
                Step::Goto(next) => {
                    debug!(from = ?state, to = ?next, "Graph transition");
                    path.push(next);
                    state = next;
                }
                Step::Finish(reply) => {
                    debug!(from = ?state, to = ?GraphState::End, "Graph transition");
                    path.push(GraphState::End);
                    break reply;
                }
            }
        };

        match &reply {
            Ok(_) => {
                self.events.publish(DomainEvent::ResponseGenerated {
                    model: self.completion.model().to_string(),
                    mode: mode.to_string(),
                    tool_turns: walk.tool_turns.len(),
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                warn!(mode = %mode, kind = e.kind(), error = %e, "Graph execution failed");
                self.events.publish(DomainEvent::ErrorOccurred {
                    context: format!("{mode} mode"),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
            }
        }

        Execution {
            path,
            tool_turns: walk.tool_turns,
            reply,
        }
    }

    async fn step(&self, state: GraphState, mode: Mode, walk: &mut Walk) -> Step {
        match state {
            GraphState::Start => Step::Goto(GraphState::Route),
            GraphState::Route => Step::Goto(route(mode).entry()),
            GraphState::PlainReply => Step::Finish(
                self.completion
                    .complete(&walk.history)
                    .await
                    .map(Message::assistant),
            ),
            GraphState::NewsReply => Step::Finish(self.news_reply(&walk.history).await),
            GraphState::ToolReply => self.tool_reply(walk).await,
            GraphState::ToolExec => self.tool_exec(walk).await,
            GraphState::End => Step::Finish(Err(Error::Internal(
                "graph stepped past its end state".into(),
            ))),
        }
    }

    /// Search the web for the opening question and return the text verbatim.
    async fn news_reply(&self, history: &[Message]) -> Result<Message, Error> {
        let first = history
            .first()
            .ok_or_else(|| Error::Internal("news reply needs at least one turn".into()))?;

        let start = std::time::Instant::now();
        let result = self.tools.invoke("web_search", &first.content).await;
        self.publish_tool_executed("web_search", result.is_ok(), start.elapsed().as_millis() as u64);

        Ok(Message::assistant(result?))
    }

    async fn tool_reply(&self, walk: &mut Walk) -> Step {
        let definitions = self.tools.definitions(&self.catalog);
        let reply = match self
            .completion
            .complete_with_tools(&walk.history, &definitions)
            .await
        {
            Ok(reply) => reply,
            Err(e) => return Step::Finish(Err(e)),
        };

        match reply {
            Reply::Text(text) => Step::Finish(Ok(Message::assistant(text))),
            Reply::ToolRequests(_) if walk.rounds >= self.max_tool_iterations => {
                warn!(
                    rounds = walk.rounds,
                    limit = self.max_tool_iterations,
                    "Max tool iterations reached, ending with notice"
                );
                Step::Finish(Ok(Message::assistant(TOOL_LIMIT_NOTICE)))
            }
            Reply::ToolRequests(requests) => {
                walk.pending = requests;
                Step::Goto(GraphState::ToolExec)
            }
        }
    }

    /// Run the pending requests in the order the model gave them.
    async fn tool_exec(&self, walk: &mut Walk) -> Step {
        walk.rounds += 1;
        debug!(round = walk.rounds, calls = walk.pending.len(), "Executing tool calls");

        for request in std::mem::take(&mut walk.pending) {
            let invocation = self
                .tools
                .invoke_in(&self.catalog, &request.name, &request.arguments)
                .await;
            self.publish_tool_executed(
                &request.name,
                invocation.result.is_ok(),
                invocation.duration_ms,
            );

            match invocation.result {
                Ok(text) => {
                    let turn = Message::tool_result(request.to_call(), text);
                    walk.history.push(turn.clone());
                    walk.tool_turns.push(turn);
                }
                Err(e) => return Step::Finish(Err(e.into())),
            }
        }
        Step::Goto(GraphState::ToolReply)
    }

    fn publish_tool_executed(&self, tool_name: &str, success: bool, duration_ms: u64) {
        self.events.publish(DomainEvent::ToolExecuted {
            tool_name: tool_name.to_string(),
            success,
            duration_ms,
            timestamp: Utc::now(),
        });
    }
}
