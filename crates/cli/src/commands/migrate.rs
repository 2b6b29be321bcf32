//! Database migration commands.
//!
//! Migrations live in `crates/api/migrations/` and are embedded into the
//! API crate as [`ecom_api::db::MIGRATOR`]. sqlx records applied versions
//! in the `_sqlx_migrations` table.
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use ecom_api::config::{ApiConfig, ConfigError};
use ecom_api::db::MIGRATOR;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

async fn connect() -> Result<PgPool, MigrationError> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(config.database_url.expose_secret()).await?;
    Ok(pool)
}

/// Apply all pending migrations.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

/// Print every known migration with its applied state.
pub async fn status() -> Result<(), MigrationError> {
    let pool = connect().await?;

    let has_table: bool =
        sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(&pool)
            .await?;

    let applied: Vec<i64> = if has_table {
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success ORDER BY version")
            .fetch_all(&pool)
            .await?
    } else {
        Vec::new()
    };

    #[allow(clippy::print_stdout)]
    {
        for migration in MIGRATOR.iter() {
            println!(
                "{:<8} {} {}",
                state_label(&applied, migration.version),
                migration.version,
                migration.description
            );
        }
    }

    Ok(())
}

fn state_label(applied: &[i64], version: i64) -> &'static str {
    if applied.contains(&version) {
        "applied"
    } else {
        "pending"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_label() {
        let applied = [20_261_019_000_001];
        assert_eq!(state_label(&applied, 20_261_019_000_001), "applied");
        assert_eq!(state_label(&applied, 20_261_019_000_002), "pending");
    }
}
