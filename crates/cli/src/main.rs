//! Dipper CLI - Place Triple Dipper delivery orders from the command line.
//!
//! # Usage
//!
//! ```bash
//! # List items and the extras each permits
//! dipper catalog
//!
//! # Find restaurants near an address
//! dipper locations --address address.yaml
//!
//! # Set location, cart, and check out; prints the session id and totals
//! dipper checkout --order order.yaml
//!
//! # Pay for a checked-out session
//! dipper place --session <SESSION_ID> --payment card.yaml
//!
//! # Check out and pay in one go
//! dipper run --order order.yaml
//! ```
//!
//! # Commands
//!
//! - `catalog` - Show the menu catalog
//! - `locations` - Search for nearby restaurants without starting a session
//! - `checkout` - Run the checkout phase
//! - `place` - Run the payment phase on a resumed session
//! - `run` - Run both phases

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "dipper")]
#[command(author, version, about = "Triple Dipper ordering tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List orderable items and their permitted extras
    Catalog,
    /// Find restaurants near an address
    Locations {
        /// Address file (YAML)
        #[arg(short, long)]
        address: PathBuf,
    },
    /// Set location, cart every triple dipper, and check out
    Checkout {
        /// Order file (YAML)
        #[arg(short, long)]
        order: PathBuf,
    },
    /// Pay for a session that has already checked out
    Place {
        /// Session id printed by `checkout`
        #[arg(short, long, env = "DIPPER_SESSION")]
        session: String,

        /// Payment file (YAML)
        #[arg(short, long)]
        payment: PathBuf,
    },
    /// Check out and pay in one session
    Run {
        /// Order file (YAML) including a `payment` section
        #[arg(short, long)]
        order: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dipper_ordering=info,dipper_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Catalog => commands::catalog::print(),
        Commands::Locations { address } => commands::locations::run(&address).await?,
        Commands::Checkout { order } => commands::order::run_checkout(&order).await?,
        Commands::Place { session, payment } => {
            commands::order::run_place(&session, &payment).await?;
        }
        Commands::Run { order } => commands::order::run_all(&order).await?,
    }
    Ok(())
}
