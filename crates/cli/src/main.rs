//! RouteChat CLI: the main entry point.
//!
//! Commands:
//! - `init`     Write a default config file
//! - `chat`     Interactive or single-message chat
//! - `serve`    Start the web page and JSON API
//! - `models`   List the selectable models
//! - `doctor`   Diagnose configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "routechat",
    about = "RouteChat: chat with normal, news, and tools modes",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write ~/.routechat/config.toml with defaults
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Chat in the terminal
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Starting mode: normal, news, or tools
        #[arg(long)]
        mode: Option<String>,

        /// Starting model (see `routechat models`)
        #[arg(long)]
        model: Option<String>,
    },

    /// Start the web page and JSON API
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the bind address
        #[arg(long)]
        host: Option<String>,
    },

    /// List the models a session can select
    Models,

    /// Diagnose configuration and credentials
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    // The REPL shares the terminal with logs, so it stays quieter than `serve`
    let filter = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Serve { .. }, false) => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // A .env file in the working directory may carry the API keys
    routechat_config::load_dotenv();

    match cli.command {
        Commands::Init { force } => commands::init::run(force).await?,
        Commands::Chat {
            message,
            mode,
            model,
        } => commands::chat::run(message, mode, model).await?,
        Commands::Serve { port, host } => commands::serve::run(port, host).await?,
        Commands::Models => commands::models::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
