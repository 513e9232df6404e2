//! `routechat chat`: Interactive or single-message chat mode.

use std::sync::Arc;

use routechat_channels::{CliChannel, render_exchange, render_turn};
use routechat_config::{AppConfig, ModelId, SessionSettings};
use routechat_core::channel::Channel;
use routechat_core::event::EventBus;
use routechat_core::mode::Mode;
use routechat_core::session::SessionStore;
use routechat_graph::{Execution, RoutingGraph};
use routechat_tools::ToolAdapter;

const HELP: &str = "\
  /mode <normal|news|tools>  switch mode for the next messages
  /model <id>                switch model (see `routechat models`)
  /history                   print the whole transcript
  /reset                     start a new conversation
  /help                      show this help
  exit                       leave";

/// A `/`-prefixed line the REPL handles itself instead of sending.
#[derive(Debug, PartialEq)]
enum SlashCommand {
    Mode(Mode),
    Model(String),
    History,
    Reset,
    Help,
    Unknown(String),
}

fn parse_slash(line: &str) -> Option<SlashCommand> {
    let rest = line.strip_prefix('/')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    Some(match name {
        "mode" => SlashCommand::Mode(Mode::parse_lossy(arg)),
        "model" => SlashCommand::Model(arg.to_string()),
        "history" => SlashCommand::History,
        "reset" | "new" => SlashCommand::Reset,
        "help" | "?" => SlashCommand::Help,
        other => SlashCommand::Unknown(other.to_string()),
    })
}

/// One terminal session: its settings, transcript, and the graph built
/// for those settings.
struct ChatSession {
    config: AppConfig,
    tools: Arc<ToolAdapter>,
    events: Arc<EventBus>,
    settings: SessionSettings,
    store: SessionStore,
    graph: RoutingGraph,
}

impl ChatSession {
    fn new(config: AppConfig, settings: SessionSettings) -> Self {
        let tools = Arc::new(ToolAdapter::from_config(&config.tools));
        let events = Arc::new(EventBus::default());
        let graph =
            RoutingGraph::from_settings(&settings, &config, tools.clone(), events.clone());
        Self {
            config,
            tools,
            events,
            settings,
            store: SessionStore::new(),
            graph,
        }
    }

    fn switch_model(&mut self, model: ModelId) {
        if self.settings.model == model {
            return;
        }
        self.settings.model = model;
        self.graph = RoutingGraph::from_settings(
            &self.settings,
            &self.config,
            self.tools.clone(),
            self.events.clone(),
        );
    }

    async fn send(&mut self, text: &str) -> Execution {
        self.graph
            .submit(&mut self.store, text, self.settings.mode)
            .await
    }
}

pub async fn run(
    message: Option<String>,
    mode: Option<String>,
    model: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let mut settings = config.session_settings()?;
    if let Some(mode) = mode {
        settings.mode = Mode::parse_lossy(&mode);
    }
    if let Some(model) = model {
        settings.model = model.parse()?;
    }

    if settings.api_key.is_none() {
        eprintln!("  No completion API key configured.");
        eprintln!("  Set GROQ_API_KEY (or ROUTECHAT_API_KEY) in the environment or a .env");
        eprintln!("  file, or add api_key to");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
    }

    let mut session = ChatSession::new(config, settings);

    if let Some(msg) = message {
        let execution = session.send(&msg).await;
        for turn in &execution.tool_turns {
            eprintln!("{}", render_turn(turn));
        }
        return match execution.reply {
            Ok(reply) => {
                println!("{}", render_exchange(&msg, &reply.content));
                Ok(())
            }
            Err(e) => Err(e.to_string().into()),
        };
    }

    // Interactive mode
    println!("RouteChat (model: {}, mode: {})", session.settings.model, session.settings.mode);
    println!("Type /help for commands, 'exit' to leave.\n");

    let channel = CliChannel::new();
    let mut rx = channel.start().await?;

    while let Some(line) = rx.recv().await {
        let line = line?.content;

        if let Some(command) = parse_slash(&line) {
            let output = match command {
                SlashCommand::Mode(mode) => {
                    session.settings.mode = mode;
                    format!("mode: {mode}")
                }
                SlashCommand::Model(id) => match id.parse::<ModelId>() {
                    Ok(model) => {
                        session.switch_model(model);
                        format!("model: {model}")
                    }
                    Err(e) => e.to_string(),
                },
                SlashCommand::History => session
                    .store
                    .turns()
                    .iter()
                    .map(render_turn)
                    .collect::<Vec<_>>()
                    .join("\n"),
                SlashCommand::Reset => {
                    session.store.reset();
                    "Started a new conversation.".to_string()
                }
                SlashCommand::Help => HELP.to_string(),
                SlashCommand::Unknown(name) => format!("Unknown command /{name}. Try /help."),
            };
            channel.send(&output).await?;
            continue;
        }

        let execution = session.send(&line).await;
        for turn in execution.new_turns() {
            channel.send(&render_turn(&turn)).await?;
        }
        if let Some(notice) = session.store.notice() {
            channel.send(&format!("! {}", notice.message)).await?;
        }
        channel.send("").await?;
    }

    println!("Goodbye!");
    Ok(())
}
