//! End-to-end tests for RouteChat.
//!
//! These drive the HTTP API with real provider and tool clients pointed at
//! a local mock server standing in for the completion endpoint, Wikipedia,
//! and the web search page.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use routechat_config::AppConfig;
use routechat_gateway::{ApiV1State, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Fixtures ─────────────────────────────────────────────────────────────

fn config_for(server: &MockServer, api_key: Option<&str>) -> AppConfig {
    let mut config = AppConfig::default();
    config.api_key = api_key.map(String::from);
    config.base_url = format!("{}/openai/v1", server.uri());
    config.tools.wikipedia_url = format!("{}/w/api.php", server.uri());
    config.tools.arxiv_url = format!("{}/api/query", server.uri());
    config.tools.duckduckgo_url = format!("{}/html/", server.uri());
    config
}

fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "model": "llama-3.1-8b-instant",
        "choices": [{ "message": { "role": "assistant", "content": text } }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 6, "total_tokens": 18 }
    }))
}

fn tool_call(id: &str, name: &str, query: &str) -> ResponseTemplate {
    let arguments = json!({ "query": query }).to_string();
    ResponseTemplate::new(200).set_body_json(json!({
        "model": "llama-3.1-8b-instant",
        "choices": [{ "message": {
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": id,
                "type": "function",
                "function": { "name": name, "arguments": arguments }
            }]
        } }]
    }))
}

async fn call(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn app_for(config: AppConfig) -> axum::Router {
    build_router(Arc::new(ApiV1State::from_config(config).unwrap()))
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn normal_mode_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(completion("Hello! How can I help?"))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(config_for(&server, Some("gsk-test")));
    let (status, body) = call(&app, "POST", "/v1/chat", Some(json!({ "message": "hi" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "normal");
    assert_eq!(body["reply"], "Hello! How can I help?");
    assert_eq!(body["path"], json!(["start", "route", "plain_reply", "end"]));

    let (_, session) = call(&app, "GET", "/v1/session", None).await;
    let transcript = session["transcript"].as_array().unwrap();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0]["role"], "user");
    assert_eq!(transcript[1]["role"], "assistant");
}

#[tokio::test]
async fn tools_mode_consults_wikipedia_then_answers() {
    let server = MockServer::start().await;

    // Second completion request carries the tool result
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(body_string_contains(r#""role":"tool""#))
        .respond_with(completion("Rust was started by Graydon Hoare."))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(tool_call("call_1", "wikipedia", "Rust programming language"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": [
                { "pageid": 1, "title": "Rust (programming language)", "index": 1,
                  "extract": "Rust is a general-purpose programming language." }
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(config_for(&server, Some("gsk-test")));
    let (status, body) = call(
        &app,
        "POST",
        "/v1/chat",
        Some(json!({ "message": "Who created Rust?", "mode": "tools" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Rust was started by Graydon Hoare.");
    assert!(body["notice"].is_null());

    let turns = body["new_turns"].as_array().unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0]["role"], "tool");
    assert_eq!(turns[0]["tool"], "wikipedia");
    assert!(
        turns[0]["content"]
            .as_str()
            .unwrap()
            .starts_with("Page: Rust (programming language)\nSummary: Rust is")
    );
    assert_eq!(turns[1]["role"], "assistant");
}

#[tokio::test]
async fn news_mode_searches_the_first_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/html/"))
        .and(body_string_contains("q=elections"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div><a class="result__snippet" href="https://x.example">Polls close at eight.</a></div>"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    let app = app_for(config_for(&server, Some("gsk-test")));
    let news = |message: &str| json!({ "message": message, "mode": "news" });

    let (_, first) = call(&app, "POST", "/v1/chat", Some(news("elections"))).await;
    assert_eq!(first["reply"], "Polls close at eight.");

    let (_, second) = call(&app, "POST", "/v1/chat", Some(news("weather"))).await;
    assert_eq!(second["reply"], "Polls close at eight.");
    assert_eq!(second["path"], json!(["start", "route", "news_reply", "end"]));
}

#[tokio::test]
async fn rejected_key_surfaces_completion_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let app = app_for(config_for(&server, Some("gsk-revoked")));
    let (status, body) = call(&app, "POST", "/v1/chat", Some(json!({ "message": "hi" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["reply"].is_null());
    assert_eq!(body["notice"]["kind"], "completion_failed");

    // The user turn stays, no assistant turn is added
    let (_, session) = call(&app, "GET", "/v1/session", None).await;
    assert_eq!(session["transcript"].as_array().unwrap().len(), 1);
    assert_eq!(session["notice"]["kind"], "completion_failed");
}

#[tokio::test]
async fn key_entered_later_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(completion("Now I can answer."))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(config_for(&server, None));

    let (_, first) = call(&app, "POST", "/v1/chat", Some(json!({ "message": "hi" }))).await;
    assert_eq!(first["notice"]["kind"], "completion_failed");

    let (status, _) = call(
        &app,
        "PUT",
        "/v1/settings",
        Some(json!({ "api_key": "gsk-fresh" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, second) = call(&app, "POST", "/v1/chat", Some(json!({ "message": "hi again" }))).await;
    assert_eq!(second["reply"], "Now I can answer.");
    assert!(second["notice"].is_null());
}
