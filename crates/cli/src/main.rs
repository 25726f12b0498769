//! Sable CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! sable-cli migrate storefront
//!
//! # Load products and bank details from YAML
//! sable-cli seed catalog catalog.yaml --clear
//!
//! # Show the most recent orders
//! sable-cli orders list --limit 20
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed catalog` - Upsert catalog and bank details
//! - `orders list` - Recent persisted orders

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sable-cli")]
#[command(author, version, about = "Sable CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Inspect persisted orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run storefront database migrations
    Storefront,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert products and the active bank account from a YAML file
    Catalog {
        /// Path to the catalog YAML file
        file: String,

        /// Delete existing products first
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List the most recent orders
    List {
        /// Maximum number of orders to show
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },
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
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, clear } => commands::seed::catalog(&file, clear).await?,
        },
        Commands::Orders { action } => match action {
            OrdersAction::List { limit } => commands::orders::list(limit).await?,
        },
    }
    Ok(())
}
