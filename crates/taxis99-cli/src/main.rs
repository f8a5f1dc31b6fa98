//! Command line client for the 99 Taxis REST API

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use taxis99::{Client, Settings};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use url::Url;

mod sub_commands;

const DEFAULT_CONFIG_FILE: &str = ".taxis99/config.toml";

/// Send requests to the 99 Taxis API
#[derive(Debug, Parser)]
#[command(name = "taxis99-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Override the API base URL
    #[arg(short, long, env = "TAXIS99_BASE_URL")]
    base_url: Option<Url>,
    /// Logging level
    #[arg(short, long, default_value = "error")]
    log_level: Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send a request and print the JSON response
    Request(sub_commands::request::RequestSubCommand),
    /// Print the effective settings
    Settings,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();
    let default_filter = args.log_level;

    let hyper_filter = "hyper=warn";

    let env_filter = EnvFilter::new(format!("{},{}", default_filter, hyper_filter));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config_file = match &args.config {
        Some(config_file) => Some(config_file.clone()),
        None => home::home_dir()
            .map(|home_dir| home_dir.join(DEFAULT_CONFIG_FILE))
            .filter(|path| path.exists()),
    };

    let mut settings = Settings::load(config_file)?;
    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.to_string();
    }

    match &args.command {
        Commands::Request(sub_command_args) => {
            let client = Client::from_settings(&settings)?;
            sub_commands::request::request(&client, sub_command_args).await
        }
        Commands::Settings => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}
