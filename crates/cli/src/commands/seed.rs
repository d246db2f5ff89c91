//! Seed the configured store with sample contacts.
//!
//! Contacts go through the normal service path, so they are validated and
//! normalized exactly like API input. Emails that already exist are skipped,
//! which makes the command safe to rerun.

use contact_book_server::config::AppConfig;
use contact_book_server::db;
use contact_book_server::models::ContactInput;
use contact_book_server::services::{ContactError, ContactService};

use super::CommandError;

const FIRST_NAMES: [&str; 8] = [
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Frances", "Ken",
];
const LAST_NAMES: [&str; 8] = [
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Allen", "Thompson",
];

/// Outcome of a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub skipped: usize,
}

/// The `index`-th sample contact. Names cycle; emails stay unique per index.
fn sample_contact(index: usize) -> ContactInput {
    let first = FIRST_NAMES.iter().cycle().nth(index).copied().unwrap_or_default();
    let last = LAST_NAMES
        .iter()
        .cycle()
        .nth(index / FIRST_NAMES.len())
        .copied()
        .unwrap_or_default();

    ContactInput {
        name: Some(format!("{first} {last}")),
        email: Some(format!(
            "{}.{}{index}@example.com",
            first.to_lowercase(),
            last.to_lowercase()
        )),
        phone: Some(format!("555-{:04}", index % 10_000)),
    }
}

/// Insert `count` sample contacts through `service`.
///
/// # Errors
///
/// Returns the first error other than a duplicate email.
pub async fn seed(service: &ContactService, count: usize) -> Result<SeedSummary, ContactError> {
    let mut summary = SeedSummary::default();

    for index in 0..count {
        match service.create(sample_contact(index)).await {
            Ok(contact) => {
                tracing::debug!(contact_id = %contact.id, "Seeded contact");
                summary.created += 1;
            }
            Err(ContactError::DuplicateEmail) => summary.skipped += 1,
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

/// Load configuration, open the store and seed it.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the store cannot be
/// opened, or an insert fails for a reason other than a duplicate email.
pub async fn run(count: usize) -> Result<SeedSummary, CommandError> {
    let config = AppConfig::from_env()?;
    let store = db::open_store(&config).await?;
    let service = ContactService::new(store);

    tracing::info!(count, "Seeding contacts");
    Ok(seed(&service, count).await?)
}
