//! `routechat init`: Write a default config file.

use routechat_config::AppConfig;

pub async fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    }

    if config_path.exists() && !force {
        println!("Config already exists: {}", config_path.display());
        println!("Run with --force to overwrite it.");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Wrote {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set GROQ_API_KEY, or put api_key in the file above");
    println!("  2. routechat chat     (terminal)");
    println!("  3. routechat serve    (browser, http://127.0.0.1:8501)");

    Ok(())
}
