//! CLI subcommands.

pub mod migrate;
pub mod seed;

use thiserror::Error;

use contact_book_server::config::ConfigError;
use contact_book_server::db::StoreError;
use contact_book_server::services::ContactError;

/// Errors from any CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),
}
