//! Contact store: persistence for contacts.
//!
//! # Backends
//!
//! - [`PgContactStore`] - `PostgreSQL` via sqlx (production)
//! - [`InMemoryContactStore`] - process-local map (tests, local demos)
//!
//! Both enforce the same rules: emails are unique case-insensitively,
//! ids are never reused, and `updated_at` never precedes `created_at`.
//!
//! # Tables
//!
//! - `contacts` - unique index on `lower(email)`, GIN text index over
//!   name, email and phone
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p contact-book-cli -- migrate
//! ```

pub mod contacts;
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use contact_book_core::{ContactId, ContactSort, Email};

use crate::config::{AppConfig, StoreBackend};
use crate::models::{Contact, ContactChanges, NewContact};

pub use contacts::PgContactStore;
pub use memory::InMemoryContactStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested contact was not found.
    #[error("not found")]
    NotFound,

    /// Uniqueness constraint violation (duplicate email).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

/// A conjunction of optional predicates over contacts.
///
/// The default filter matches every contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    /// Free-text search over name, email and phone.
    pub search: Option<String>,
    /// Exact (normalized) email.
    pub email: Option<Email>,
    /// Exclude this contact, e.g. the one being updated.
    pub exclude_id: Option<ContactId>,
    /// Only contacts created at or after this instant.
    pub created_since: Option<DateTime<Utc>>,
}

impl ContactFilter {
    /// Match every contact.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Text search. A blank search string matches everything.
    #[must_use]
    pub fn search(text: &str) -> Self {
        let text = text.trim();
        Self {
            search: (!text.is_empty()).then(|| text.to_owned()),
            ..Self::default()
        }
    }

    /// Match the contact with this email.
    #[must_use]
    pub fn email(email: &Email) -> Self {
        Self {
            email: Some(email.clone()),
            ..Self::default()
        }
    }

    /// Match contacts created at or after `since`.
    #[must_use]
    pub fn created_since(since: DateTime<Utc>) -> Self {
        Self {
            created_since: Some(since),
            ..Self::default()
        }
    }

    /// Additionally exclude the contact with `id`.
    #[must_use]
    pub fn excluding(mut self, id: ContactId) -> Self {
        self.exclude_id = Some(id);
        self
    }

    /// Lowercased search words. A contact matches a search when any word
    /// matches.
    #[must_use]
    pub fn search_terms(&self) -> Vec<String> {
        self.search.as_deref().map(words).unwrap_or_default()
    }

    /// Evaluate the filter against a single contact.
    #[must_use]
    pub fn matches(&self, contact: &Contact) -> bool {
        if self.email.as_ref().is_some_and(|e| *e != contact.email) {
            return false;
        }
        if self.exclude_id == Some(contact.id) {
            return false;
        }
        if self.created_since.is_some_and(|since| contact.created_at < since) {
            return false;
        }
        if self.search.is_some() {
            let terms = self.search_terms();
            let fields = [
                contact.name.as_str(),
                contact.email.as_str(),
                contact.phone.as_str(),
            ];
            let document: Vec<String> = fields.into_iter().flat_map(words).collect();
            return terms.iter().any(|term| document.contains(term));
        }
        true
    }
}

/// Split text into lowercase words at every non-alphanumeric character,
/// so `ada.lovelace@gmail.com` yields `ada`, `lovelace`, `gmail`, `com`.
///
/// `SEARCH_DOCUMENT` in the `PostgreSQL` store tokenizes the same way.
fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Persistence operations on contacts.
///
/// Implementations must serialize conflicting writes: of two concurrent
/// inserts with the same email exactly one succeeds and the other fails
/// with [`StoreError::ConstraintViolation`].
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Insert a contact, generating its id and timestamps.
    async fn insert(&self, contact: NewContact) -> Result<Contact, StoreError>;

    /// Fetch a contact by id, or `NotFound`.
    async fn find_by_id(&self, id: ContactId) -> Result<Contact, StoreError>;

    /// First contact matching `filter`, if any.
    async fn find_one(&self, filter: &ContactFilter) -> Result<Option<Contact>, StoreError>;

    /// One ordered page of contacts matching `filter`.
    async fn find_many(
        &self,
        filter: &ContactFilter,
        sort: ContactSort,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Contact>, StoreError>;

    /// Total number of contacts matching `filter`.
    async fn count(&self, filter: &ContactFilter) -> Result<u64, StoreError>;

    /// Apply `changes` and refresh `updated_at`, or `NotFound`.
    async fn update_by_id(
        &self,
        id: ContactId,
        changes: ContactChanges,
    ) -> Result<Contact, StoreError>;

    /// Remove a contact and return it, or `NotFound`.
    async fn delete_by_id(&self, id: ContactId) -> Result<Contact, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Open the store selected by configuration.
///
/// # Errors
///
/// Returns `StoreError::Database` if the `PostgreSQL` pool cannot be created.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn ContactStore>, StoreError> {
    match &config.store {
        StoreBackend::Postgres { database_url } => {
            let pool = create_pool(database_url).await?;
            tracing::info!("Database pool created");
            Ok(Arc::new(PgContactStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory contact store; data is lost on restart");
            Ok(Arc::new(InMemoryContactStore::new()))
        }
    }
}
