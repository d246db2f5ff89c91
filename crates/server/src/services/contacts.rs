//! Contact query service.
//!
//! Translates request parameters into store calls and enforces the
//! business rules: required fields, lowercase emails, and email uniqueness
//! against *other* contacts. Holds no state beyond the store handle.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use contact_book_core::{ContactId, ContactSort, Email, PageRequest, SortField, SortOrder};

use crate::db::{ContactFilter, ContactStore, StoreError};
use crate::models::{Contact, ContactChanges, ContactInput, NewContact};

/// Window for the "recent contacts" statistic.
const RECENT_WINDOW_DAYS: i64 = 7;

/// One field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn required(field: &'static str) -> Self {
        Self {
            field,
            message: format!("{} is required", capitalize(field)),
        }
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

/// Errors from contact operations.
#[derive(Debug, Error)]
pub enum ContactError {
    /// One or more fields are missing or malformed.
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    /// Another contact already uses this email.
    #[error("email already in use")]
    DuplicateEmail,

    /// No contact has the requested id.
    #[error("contact not found")]
    NotFound,

    /// The store failed.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ContactError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::ConstraintViolation(_) => Self::DuplicateEmail,
            other => Self::Store(other),
        }
    }
}

/// Parameters of a listing request, already normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: ContactSort,
    pub page: PageRequest,
}

impl ListQuery {
    /// Build from raw query-string values, applying defaults and clamping.
    #[must_use]
    pub fn from_params(
        search: Option<&str>,
        sort_by: Option<&str>,
        order: Option<&str>,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> Self {
        Self {
            search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            sort: ContactSort::new(SortField::from_param(sort_by), SortOrder::from_param(order)),
            page: PageRequest::from_params(page, limit),
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    pub total_count: u64,
    pub total_pages: u64,
    pub page: PageRequest,
}

/// Aggregate numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStats {
    pub total_contacts: u64,
    /// Contacts created in the last seven days.
    pub recent_contacts: u64,
    /// `recent / total` as a rounded percentage; 0 when there are no contacts.
    pub growth_rate: u64,
}

impl ContactStats {
    fn new(total_contacts: u64, recent_contacts: u64) -> Self {
        let growth_rate = if total_contacts == 0 {
            0
        } else {
            (recent_contacts * 100 + total_contacts / 2) / total_contacts
        };
        Self {
            total_contacts,
            recent_contacts,
            growth_rate,
        }
    }
}

/// Stateless contact operations over a [`ContactStore`].
#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn ContactStore>,
}

impl ContactService {
    #[must_use]
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// List contacts matching an optional search, sorted and paginated.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Store` if the store fails.
    pub async fn list(&self, query: &ListQuery) -> Result<ContactPage, ContactError> {
        let filter = query
            .search
            .as_deref()
            .map_or_else(ContactFilter::all, ContactFilter::search);

        let total_count = self.store.count(&filter).await?;
        let contacts = self
            .store
            .find_many(
                &filter,
                query.sort,
                query.page.offset(),
                query.page.limit(),
            )
            .await?;

        tracing::debug!(
            total_count,
            returned = contacts.len(),
            page = query.page.page(),
            "Listed contacts"
        );

        Ok(ContactPage {
            contacts,
            total_count,
            total_pages: query.page.total_pages(total_count),
            page: query.page,
        })
    }

    /// Fetch one contact.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::NotFound` if no contact has this id.
    pub async fn get(&self, id: ContactId) -> Result<Contact, ContactError> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Create a contact after validating and normalizing the input.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Validation` for missing fields and
    /// `ContactError::DuplicateEmail` if the email is taken.
    pub async fn create(&self, input: ContactInput) -> Result<Contact, ContactError> {
        let new_contact = validate_new(input)?;

        if self
            .store
            .find_one(&ContactFilter::email(&new_contact.email))
            .await?
            .is_some()
        {
            return Err(ContactError::DuplicateEmail);
        }

        // A concurrent insert can still win the race; the store reports it
        // as a constraint violation, which maps to DuplicateEmail.
        let contact = self.store.insert(new_contact).await?;
        tracing::info!(contact_id = %contact.id, "Contact created");
        Ok(contact)
    }

    /// Update the supplied fields of a contact and refresh `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Validation` for blank fields,
    /// `ContactError::DuplicateEmail` if another contact has the email, and
    /// `ContactError::NotFound` if the contact does not exist.
    pub async fn update(&self, id: ContactId, input: ContactInput) -> Result<Contact, ContactError> {
        let changes = validate_changes(input)?;

        if let Some(email) = &changes.email
            && self
                .store
                .find_one(&ContactFilter::email(email).excluding(id))
                .await?
                .is_some()
        {
            return Err(ContactError::DuplicateEmail);
        }

        let contact = self.store.update_by_id(id, changes).await?;
        tracing::info!(contact_id = %contact.id, "Contact updated");
        Ok(contact)
    }

    /// Delete a contact, returning it.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::NotFound` if the contact does not exist.
    pub async fn delete(&self, id: ContactId) -> Result<Contact, ContactError> {
        let contact = self.store.delete_by_id(id).await?;
        tracing::info!(contact_id = %contact.id, "Contact deleted");
        Ok(contact)
    }

    /// Totals for the dashboard cards.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Store` if the store fails.
    pub async fn stats(&self) -> Result<ContactStats, ContactError> {
        let since = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
        let total = self.store.count(&ContactFilter::all()).await?;
        let recent = self
            .store
            .count(&ContactFilter::created_since(since))
            .await?;
        Ok(ContactStats::new(total, recent))
    }
}

/// Trimmed, non-empty value of a supplied field.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn parse_email(raw: &str, errors: &mut Vec<FieldError>) -> Option<Email> {
    match Email::parse(raw) {
        Ok(email) => Some(email),
        Err(e) => {
            errors.push(FieldError {
                field: "email",
                message: format!("Invalid email: {e}"),
            });
            None
        }
    }
}

fn validate_new(input: ContactInput) -> Result<NewContact, ContactError> {
    let mut errors = Vec::new();

    let name = non_blank(input.name);
    if name.is_none() {
        errors.push(FieldError::required("name"));
    }
    let email = match non_blank(input.email) {
        Some(raw) => parse_email(&raw, &mut errors),
        None => {
            errors.push(FieldError::required("email"));
            None
        }
    };
    let phone = non_blank(input.phone);
    if phone.is_none() {
        errors.push(FieldError::required("phone"));
    }

    match (name, email, phone) {
        (Some(name), Some(email), Some(phone)) if errors.is_empty() => {
            Ok(NewContact { name, email, phone })
        }
        _ => Err(ContactError::Validation(errors)),
    }
}

fn validate_changes(input: ContactInput) -> Result<ContactChanges, ContactError> {
    let mut errors = Vec::new();
    let mut changes = ContactChanges::default();

    if let Some(name) = input.name {
        changes.name = non_blank(Some(name));
        if changes.name.is_none() {
            errors.push(FieldError::required("name"));
        }
    }
    if let Some(email) = input.email {
        match non_blank(Some(email)) {
            Some(raw) => changes.email = parse_email(&raw, &mut errors),
            None => errors.push(FieldError::required("email")),
        }
    }
    if let Some(phone) = input.phone {
        changes.phone = non_blank(Some(phone));
        if changes.phone.is_none() {
            errors.push(FieldError::required("phone"));
        }
    }

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(ContactError::Validation(errors))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::InMemoryContactStore;

    fn service() -> ContactService {
        ContactService::new(Arc::new(InMemoryContactStore::new()))
    }

    fn input(name: &str, email: &str, phone: &str) -> ContactInput {
        ContactInput {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            phone: Some(phone.to_string()),
        }
    }

    #[tokio::test]
    async fn test_count_matches_number_of_creates() {
        let service = service();
        for i in 0..12 {
            service
                .create(input(&format!("Person {i}"), &format!("p{i}@x.com"), "1"))
                .await
                .unwrap();
        }

        let page = service.list(&ListQuery::default()).await.unwrap();
        assert_eq!(page.total_count, 12);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.contacts.len(), 10);
    }

    #[tokio::test]
    async fn test_create_normalizes_and_trims() {
        let contact = service()
            .create(input("  Ada  ", " Ada@Example.COM ", " 555 "))
            .await
            .unwrap();

        assert_eq!(contact.name, "Ada");
        assert_eq!(contact.email.as_str(), "ada@example.com");
        assert_eq!(contact.phone, "555");
        assert_eq!(contact.created_at, contact.updated_at);
    }

    #[tokio::test]
    async fn test_create_reports_every_missing_field() {
        let err = service()
            .create(ContactInput {
                name: Some("   ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        let ContactError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["name", "email", "phone"]);
        assert_eq!(errors[0].message, "Name is required");
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_email() {
        let err = service()
            .create(input("Ada", "not-an-email", "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::Validation(ref e) if e[0].field == "email"));
    }

    #[tokio::test]
    async fn test_duplicate_email_differing_in_case() {
        let service = service();
        service.create(input("A", "a@x.com", "1")).await.unwrap();

        let err = service.create(input("B", "A@X.COM", "2")).await.unwrap_err();
        assert!(matches!(err, ContactError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_update_to_own_email_succeeds() {
        let service = service();
        let ada = service.create(input("Ada", "ada@x.com", "1")).await.unwrap();

        let updated = service
            .update(
                ada.id,
                ContactInput {
                    email: Some("ADA@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email.as_str(), "ada@x.com");
    }

    #[tokio::test]
    async fn test_update_to_other_email_collides() {
        let service = service();
        let ada = service.create(input("Ada", "ada@x.com", "1")).await.unwrap();
        service.create(input("Bob", "bob@x.com", "2")).await.unwrap();

        let err = service
            .update(
                ada.id,
                ContactInput {
                    email: Some("Bob@X.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_update_phone_only_refreshes_updated_at() {
        let service = service();
        let ada = service.create(input("Ada", "ada@x.com", "1")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = service
            .update(
                ada.id,
                ContactInput {
                    phone: Some("999".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.phone, "999");
        assert_eq!(updated.name, ada.name);
        assert_eq!(updated.email, ada.email);
        assert_eq!(updated.created_at, ada.created_at);
        assert!(updated.updated_at > ada.updated_at);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_supplied_field() {
        let service = service();
        let ada = service.create(input("Ada", "ada@x.com", "1")).await.unwrap();

        let err = service
            .update(
                ada.id,
                ContactInput {
                    name: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_contact() {
        let service = service();
        let id = ContactId::generate();

        let err = service.update(id, ContactInput::default()).await.unwrap_err();
        assert!(matches!(err, ContactError::NotFound));

        let err = service.delete(id).await.unwrap_err();
        assert!(matches!(err, ContactError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = service();
        let ada = service.create(input("Ada", "ada@x.com", "1")).await.unwrap();

        let removed = service.delete(ada.id).await.unwrap();
        assert_eq!(removed, ada);
        assert!(matches!(
            service.get(ada.id).await,
            Err(ContactError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_search_filters_results() {
        let service = service();
        service.create(input("Ada Lovelace", "ada@x.com", "1")).await.unwrap();
        service.create(input("Grace Hopper", "grace@x.com", "2")).await.unwrap();
        service.create(input("Alan Turing", "alan@x.com", "3")).await.unwrap();

        let query = ListQuery::from_params(Some("hopper turing"), None, None, None, None);
        let page = service.list(&query).await.unwrap();
        assert_eq!(page.total_count, 2);

        let query = ListQuery::from_params(Some("  "), None, None, None, None);
        assert!(query.search.is_none());
    }

    #[tokio::test]
    async fn test_search_matches_email_and_phone_fragments() {
        let service = service();
        service
            .create(input("Ada Lovelace", "ada.lovelace@gmail.com", "555-0101"))
            .await
            .unwrap();
        service
            .create(input("Grace Hopper", "grace@navy.mil", "555-0199"))
            .await
            .unwrap();

        for search in ["gmail", "lovelace", "0101"] {
            let query = ListQuery::from_params(Some(search), None, None, None, None);
            let page = service.list(&query).await.unwrap();
            assert_eq!(page.total_count, 1, "search {search:?}");
            assert_eq!(page.contacts[0].name, "Ada Lovelace");
        }

        let query = ListQuery::from_params(Some("555"), None, None, None, None);
        assert_eq!(service.list(&query).await.unwrap().total_count, 2);
    }

    #[tokio::test]
    async fn test_stats() {
        let service = service();
        assert_eq!(service.stats().await.unwrap(), ContactStats::new(0, 0));

        for i in 0..3 {
            service
                .create(input("P", &format!("p{i}@x.com"), "1"))
                .await
                .unwrap();
        }
        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_contacts, 3);
        assert_eq!(stats.recent_contacts, 3);
        assert_eq!(stats.growth_rate, 100);
    }

    #[test]
    fn test_growth_rate_rounds() {
        assert_eq!(ContactStats::new(3, 1).growth_rate, 33);
        assert_eq!(ContactStats::new(3, 2).growth_rate, 67);
        assert_eq!(ContactStats::new(8, 1).growth_rate, 13);
        assert_eq!(ContactStats::new(0, 0).growth_rate, 0);
    }

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery::from_params(None, Some("bogus"), Some("up"), Some("-3"), Some("0"));
        assert_eq!(query.sort, ContactSort::default());
        assert_eq!(query.page, PageRequest::new(1, 1));
    }
}
