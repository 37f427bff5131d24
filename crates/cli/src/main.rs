//! Multiship CLI - database migrations and payload inspection.
//!
//! # Usage
//!
//! ```bash
//! # Create or upgrade the address table
//! multiship-cli migrate
//!
//! # Print a stored userdata value as JSON
//! multiship-cli decode '{"version":1,"address":{"shipping_city":"Pune"}}'
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "multiship-cli")]
#[command(author, version, about = "Multiship CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Decode a stored userdata value and print it as JSON
    Decode {
        /// Raw column value; read from stdin when omitted
        blob: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "multiship_cli=info,sqlx=warn".into()),
        )
        .with_writer(std::io::stderr)
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Decode { blob } => commands::decode::run(blob)?,
    }
    Ok(())
}
