//! `routechat doctor`: Diagnose configuration and credentials.

use routechat_config::{AppConfig, WebSearchBackend};
use routechat_core::provider::Provider;
use routechat_providers::OpenAiCompatProvider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("RouteChat Doctor");
    println!("================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ok   Config file found: {}", config_path.display());
    } else {
        println!("  --   No config file, using defaults (run `routechat init`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ok   Configuration valid");
            config
        }
        Err(e) => {
            println!("  FAIL Configuration invalid: {e}");
            println!("\n  1 issue found.");
            return Ok(());
        }
    };

    println!("  ok   Model: {}", config.model);
    println!("  ok   Mode: {}", config.mode);

    if let Some(key) = &config.api_key {
        println!("  ok   Completion API key configured");

        let provider = OpenAiCompatProvider::new("groq", config.base_url.clone(), key.clone());
        match provider.health_check().await {
            Ok(true) => println!("  ok   Completion endpoint reachable: {}", config.base_url),
            Ok(false) => {
                println!("  FAIL Completion endpoint rejected the key: {}", config.base_url);
                issues += 1;
            }
            Err(e) => {
                println!("  FAIL Completion endpoint unreachable: {e}");
                issues += 1;
            }
        }
    } else {
        println!("  WARN No completion API key (GROQ_API_KEY or api_key)");
        issues += 1;
    }

    match config.tools.web_search_backend {
        WebSearchBackend::DuckDuckGo => {
            println!("  ok   News search: DuckDuckGo (no key needed)");
        }
        WebSearchBackend::Tavily if config.tools.search_api_key.is_some() => {
            println!("  ok   News search: Tavily");
        }
        WebSearchBackend::Tavily => {
            println!("  WARN News search uses Tavily but TAVILY_API_KEY is not set");
            issues += 1;
        }
    }

    println!(
        "  ok   Gateway address: {}:{}",
        config.gateway.host, config.gateway.port
    );

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
