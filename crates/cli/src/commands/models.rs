//! `routechat models`: List the selectable models.

use routechat_config::{AppConfig, ModelId};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // A broken config should not hide the list
    let current = AppConfig::load().ok().and_then(|c| c.model_id().ok());

    for model in ModelId::ALL {
        let marker = if Some(model) == current { "*" } else { " " };
        println!("  {marker} {model}");
    }
    Ok(())
}
