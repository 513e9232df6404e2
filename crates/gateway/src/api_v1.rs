//! HTTP API v1: the JSON surface behind the web page.
//!
//! Endpoints:
//!
//! - `GET  /v1/session`   Settings, supported models and modes, transcript, notice
//! - `PUT  /v1/settings`  Update credential, model, or mode
//! - `POST /v1/chat`      Submit a message, get the new turns
//! - `POST /v1/reset`     Clear the transcript
//!
//! The gateway serves a single session. Its lock is held for the whole graph
//! execution, so concurrent submissions run one after the other.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
};
use routechat_config::{AppConfig, ConfigError, ModelId, SessionSettings};
use routechat_core::event::EventBus;
use routechat_core::message::{Message, Role};
use routechat_core::mode::Mode;
use routechat_core::session::{Notice, SessionStore};
use routechat_graph::{GraphState, RoutingGraph};
use routechat_tools::ToolAdapter;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

// ── State ─────────────────────────────────────────────────────────────────

/// Builds the routing graph for a set of session settings.
pub type GraphFactory = Box<dyn Fn(&SessionSettings) -> RoutingGraph + Send + Sync>;

/// The one session this gateway serves.
pub struct Session {
    pub settings: SessionSettings,
    pub store: SessionStore,
    pub graph: RoutingGraph,
}

/// Shared state for the v1 API.
pub struct ApiV1State {
    pub session: Mutex<Session>,
    build_graph: GraphFactory,
}

pub type SharedApiState = Arc<ApiV1State>;

impl ApiV1State {
    pub fn new(settings: SessionSettings, build_graph: GraphFactory) -> Self {
        let graph = build_graph(&settings);
        Self {
            session: Mutex::new(Session {
                settings,
                store: SessionStore::new(),
                graph,
            }),
            build_graph,
        }
    }

    /// State wired to the real completion endpoint and lookup tools.
    pub fn from_config(config: AppConfig) -> Result<Self, ConfigError> {
        let settings = config.session_settings()?;
        let tools = Arc::new(ToolAdapter::from_config(&config.tools));
        let events = Arc::new(EventBus::default());

        let build_graph: GraphFactory = Box::new(move |settings: &SessionSettings| {
            RoutingGraph::from_settings(settings, &config, tools.clone(), events.clone())
        });
        Ok(Self::new(settings, build_graph))
    }
}

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/session", get(get_session_handler))
        .route("/settings", put(update_settings_handler))
        .route("/chat", post(chat_handler))
        .route("/reset", post(reset_handler))
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SettingsView {
    pub has_api_key: bool,
    pub model: ModelId,
    pub mode: Mode,
}

impl From<&SessionSettings> for SettingsView {
    fn from(s: &SessionSettings) -> Self {
        Self {
            has_api_key: s.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()),
            model: s.model,
            mode: s.mode,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TurnDto {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl From<&Message> for TurnDto {
    fn from(m: &Message) -> Self {
        Self {
            role: m.role,
            content: m.content.clone(),
            tool: m.in_reply_to.as_ref().map(|c| c.name.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub settings: SettingsView,
    pub models: Vec<&'static str>,
    pub modes: Vec<&'static str>,
    pub transcript: Vec<TurnDto>,
    pub notice: Option<Notice>,
}

impl SessionView {
    fn of(session: &Session) -> Self {
        Self {
            settings: SettingsView::from(&session.settings),
            models: ModelId::supported(),
            modes: Mode::ALL.iter().map(|m| m.as_str()).collect(),
            transcript: session.store.turns().iter().map(TurnDto::from).collect(),
            notice: session.store.notice().cloned(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SettingsUpdate {
    /// New credential. An empty string clears it.
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Overrides the session mode for this message.
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub mode: Mode,
    pub path: Vec<GraphState>,
    pub new_turns: Vec<TurnDto>,
    pub reply: Option<String>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn get_session_handler(State(state): State<SharedApiState>) -> Json<SessionView> {
    let session = state.session.lock().await;
    Json(SessionView::of(&session))
}

async fn update_settings_handler(
    State(state): State<SharedApiState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<SettingsView>, ApiError> {
    let mut session = state.session.lock().await;
    let mut settings = session.settings.clone();

    if let Some(model) = update.model {
        settings.model = model.parse().map_err(|e: ConfigError| bad_request(e))?;
    }
    if let Some(mode) = update.mode {
        settings.mode = Mode::parse_lossy(&mode);
    }
    if let Some(key) = update.api_key {
        settings.api_key = Some(key).filter(|k| !k.trim().is_empty());
    }

    if settings != session.settings {
        info!(model = %settings.model, mode = %settings.mode, "Session settings changed");
        session.graph = (state.build_graph)(&settings);
        session.settings = settings;
    }

    Ok(Json(SettingsView::from(&session.settings)))
}

async fn chat_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(bad_request("message must not be empty"));
    }

    let mut session = state.session.lock().await;
    let mode = payload
        .mode
        .as_deref()
        .map(Mode::parse_lossy)
        .unwrap_or(session.settings.mode);
    info!(mode = %mode, message_len = message.len(), "v1/chat request");

    let Session { store, graph, .. } = &mut *session;
    let execution = graph.submit(store, message, mode).await;

    Ok(Json(ChatResponse {
        mode,
        path: execution.path.clone(),
        new_turns: execution.new_turns().iter().map(TurnDto::from).collect(),
        reply: execution.reply.as_ref().ok().map(|m| m.content.clone()),
        notice: store.notice().cloned(),
    }))
}

async fn reset_handler(State(state): State<SharedApiState>) -> Json<SessionView> {
    let mut session = state.session.lock().await;
    session.store.reset();
    info!("Session transcript cleared");
    Json(SessionView::of(&session))
}
