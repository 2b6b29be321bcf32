//! Database operations for the API `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `"user"` - Customer accounts (unique email)
//! - `"order"` - Orders, each owned by one user
//! - `product` - Catalog products
//! - `order_product` - Order/product association with quantity
//!
//! # Transactions
//!
//! Repositories borrow a single connection. Handlers open one transaction per
//! request with [`begin`], build whichever repositories they need on it, and
//! commit at the end; dropping the transaction on an error path rolls back.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p ecom-cli -- migrate run
//! ```

pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Embedded schema migrations, applied out-of-band by the CLI.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The write refers to a row that does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

impl RepositoryError {
    /// Classify a failed write.
    ///
    /// Unique violations become `Conflict(on_unique)`, foreign key violations
    /// become `InvalidReference(on_foreign_key)`; everything else stays a
    /// database error.
    pub(crate) fn from_write(err: sqlx::Error, on_unique: &str, on_foreign_key: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(on_unique.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::InvalidReference(on_foreign_key.to_owned());
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2.min(max_connections))
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Begin the transaction a request runs in.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if no connection can be acquired.
pub async fn begin(pool: &PgPool) -> Result<Transaction<'static, Postgres>, RepositoryError> {
    Ok(pool.begin().await?)
}

/// Commit a request transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the commit fails.
pub async fn commit(tx: Transaction<'static, Postgres>) -> Result<(), RepositoryError> {
    Ok(tx.commit().await?)
}
