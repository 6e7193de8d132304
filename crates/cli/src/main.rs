//! Tamarind CLI - Database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run shop database migrations
//! tam-cli migrate shop
//!
//! # Run blog database migrations
//! tam-cli migrate blog
//!
//! # Run all database migrations
//! tam-cli migrate all
//!
//! # Seed sample data for local development
//! tam-cli seed shop
//! tam-cli seed blog
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed databases with sample data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tam-cli")]
#[command(author, version, about = "Tamarind CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: Target,
    },
    /// Seed a database with sample data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum Target {
    /// Run shop database migrations
    Shop,
    /// Run blog database migrations
    Blog,
    /// Run all database migrations
    All,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Seed the shop database (products, categories, a demo user)
    Shop,
    /// Seed the blog database (posts, categories, tags)
    Blog,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            Target::Shop => commands::migrate::shop().await?,
            Target::Blog => commands::migrate::blog().await?,
            Target::All => {
                commands::migrate::shop().await?;
                commands::migrate::blog().await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Shop => commands::seed::shop().await?,
            SeedTarget::Blog => commands::seed::blog().await?,
        },
    }
    Ok(())
}
