//! Ecom CLI - Database migrations.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! ecom-cli migrate run
//!
//! # Show applied and pending migrations
//! ecom-cli migrate status
//! ```
//!
//! The database URL is read from `API_DATABASE_URL` (or `DATABASE_URL`),
//! with `.env` loaded first, exactly like the API server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ecom-cli")]
#[command(author, version, about = "Ecom API CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Run,
    /// List applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() {
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
        Commands::Migrate { action } => match action {
            MigrateAction::Run => commands::migrate::run().await?,
            MigrateAction::Status => commands::migrate::status().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_migrate_status() {
        let cli = Cli::try_parse_from(["ecom-cli", "migrate", "status"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Migrate {
                action: MigrateAction::Status
            })
        ));
    }

    #[test]
    fn test_migrate_requires_action() {
        assert!(Cli::try_parse_from(["ecom-cli", "migrate"]).is_err());
    }
}
