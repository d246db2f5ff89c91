//! Database migration command.
//!
//! Applies the migrations in `crates/server/migrations/`, which are embedded
//! at compile time.
//!
//! # Environment Variables
//!
//! - `CONTACTS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use secrecy::ExposeSecret;
use sqlx::PgPool;

use contact_book_server::config;

use super::CommandError;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails to apply.
pub async fn run() -> Result<(), CommandError> {
    let database_url = config::database_url_from_env()?;

    tracing::info!("Connecting to contacts database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running contacts migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Contacts migrations complete!");
    Ok(())
}
