//! `routechat serve`: Start the web page and JSON API.

use routechat_config::AppConfig;

pub async fn run(port: Option<u16>, host: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port {
        config.gateway.port = port;
    }
    if let Some(host) = host {
        config.gateway.host = host;
    }

    println!(
        "RouteChat listening on http://{}:{}",
        config.gateway.host, config.gateway.port
    );
    println!("  GET  /            chat page");
    println!("  GET  /health      health check");
    println!("  GET  /v1/session  settings, models, transcript");
    println!("  PUT  /v1/settings update key, model, mode");
    println!("  POST /v1/chat     send a message");
    println!("  POST /v1/reset    start a new conversation");
    println!();

    routechat_gateway::start(config).await
}
