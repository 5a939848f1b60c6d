#![forbid(unsafe_code)]
//! explorerc - command line client for an explorerd node

use clap::{Parser, Subcommand};
use explorerd::client::Client;
use explorerd::config::PASSWORD_ENV;
use explorerd::types::{Address, ElementId};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "explorerc", version, about = "Talk to an explorerd node")]
struct Cli {
    /// Base URL of the node's API
    #[arg(long, default_value = "http://127.0.0.1:9980")]
    addr: String,

    /// API password; falls back to the environment, then a prompt
    #[arg(long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List connected peers
    Peers,
    /// Connect to a peer
    Connect { peer: String },
    /// Find out what an element id refers to
    Search { id: ElementId },
    /// Show the balances of one or more addresses
    Balance {
        #[arg(required = true)]
        addresses: Vec<Address>,
    },
    /// List unconfirmed transactions
    Txpool,
    /// Show the latest chain stats
    Tip,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let password = match cli.password.or_else(|| std::env::var(PASSWORD_ENV).ok()) {
        Some(p) => p,
        None => rpassword::prompt_password("API password: ")?,
    };
    let client = Client::new(cli.addr, password)?;

    match cli.command {
        Command::Peers => {
            for peer in client.syncer_peers().await? {
                println!("{}", peer);
            }
        }
        Command::Connect { peer } => {
            client.syncer_connect(&peer).await?;
            println!("connected to {}", peer);
        }
        Command::Search { id } => print_json(&client.search(&id).await?)?,
        Command::Balance { addresses } => print_json(&client.batch_balance(&addresses).await?)?,
        Command::Txpool => print_json(&client.txpool_transactions().await?)?,
        Command::Tip => print_json(&client.chain_stats_latest().await?)?,
    }
    Ok(())
}
