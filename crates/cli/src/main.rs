//! Contact book CLI - database migrations and sample data.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! contacts-cli migrate
//!
//! # Insert 25 sample contacts
//! contacts-cli seed --count 25
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "contacts-cli")]
#[command(author, version, about = "Contact book CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert sample contacts into the configured store
    Seed {
        /// Number of contacts to create
        #[arg(short, long, default_value_t = 20)]
        count: usize,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { count } => {
            let summary = commands::seed::run(count).await?;
            tracing::info!(
                created = summary.created,
                skipped = summary.skipped,
                "Seeding complete"
            );
        }
    }
    Ok(())
}
