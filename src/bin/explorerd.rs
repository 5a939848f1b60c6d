#![forbid(unsafe_code)]
//! explorerd - authenticated explorer API node

use clap::Parser;
use explorerd::config::{load_config, DEFAULT_CONFIG_PATH, PASSWORD_ENV};
use explorerd::node::{init_tracing, Node};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "explorerd", version, about = "Query and admission API for a blockchain explorer")]
struct Cli {
    /// Path to the config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Address to serve the API on, overrides http.address
    #[arg(long)]
    http: Option<String>,

    /// Log level, overrides log.level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(addr) = cli.http {
        config.http.address = addr;
    }
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }
    init_tracing(&config.log.level);

    if config.http.password.is_empty() {
        eprintln!("No API password configured (set http.password or {}).", PASSWORD_ENV);
        config.http.password = rpassword::prompt_password("Enter API password: ")?;
    }
    if let Err(e) = config.validate() {
        error!("{}", e);
        return Err(e.into());
    }

    let node = Node::init(config);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for shutdown signal: {}", e);
        }
        info!("shutdown requested");
    };
    node.start(shutdown).await
}
