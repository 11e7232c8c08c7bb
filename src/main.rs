//! rednote-mcp
//!
//! Entry point for the xiaohongshu automation server.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

use rednote_config::{Config, ConfigLoader};

mod server;

/// rednote-mcp CLI.
#[derive(Parser)]
#[command(name = "rednote-mcp")]
#[command(about = "Xiaohongshu automation over REST and MCP")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "REDNOTE_CONFIG")]
    config: Option<PathBuf>,

    /// Run Chrome headless (overrides the config file)
    #[arg(long, global = true)]
    headless: Option<bool>,

    /// Chrome executable path
    #[arg(long, global = true)]
    bin: Option<String>,

    /// Server host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Server port
    #[arg(long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST and MCP server in foreground (default)
    Run,

    /// Log in interactively by scanning a QR code in a visible browser
    Login,
}

impl Cli {
    /// Load the config file, then apply command line overrides.
    fn load_config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let mut config = ConfigLoader::load_or_default(self.config.as_deref())?;
        if let Some(headless) = self.headless {
            config.browser.headless = headless;
        }
        if let Some(bin) = &self.bin {
            config.browser.bin_path = bin.clone();
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    server::init_tracing()?;

    let config = cli.load_config()?;
    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => server::run_server(config).await,
        Commands::Login => server::run_login(config).await,
    };

    if let Err(e) = &result {
        error!("rednote-mcp exited with error: {}", e);
    }
    result
}
