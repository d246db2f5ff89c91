//! In-memory contact store.
//!
//! Every write takes the single write lock, so the duplicate-email check
//! and the write it guards are atomic with respect to other writers.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use contact_book_core::{ContactId, ContactSort, SortField};

use super::{ContactFilter, ContactStore, StoreError};
use crate::models::{Contact, ContactChanges, NewContact};

/// Contact store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryContactStore {
    contacts: RwLock<HashMap<ContactId, Contact>>,
}

impl InMemoryContactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare(a: &Contact, b: &Contact, field: SortField) -> Ordering {
    let primary = match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::Email => a.email.cmp(&b.email),
        SortField::Phone => a.phone.cmp(&b.phone),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn to_index(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn insert(&self, contact: NewContact) -> Result<Contact, StoreError> {
        let mut contacts = self.contacts.write().await;
        if contacts.values().any(|c| c.email == contact.email) {
            return Err(StoreError::ConstraintViolation(
                "email already exists".to_owned(),
            ));
        }

        let mut id = ContactId::generate();
        while contacts.contains_key(&id) {
            id = ContactId::generate();
        }
        let now = Utc::now();
        let created = Contact {
            id,
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            created_at: now,
            updated_at: now,
        };
        contacts.insert(id, created.clone());

        tracing::debug!(contact_id = %id, "Inserted contact");
        Ok(created)
    }

    async fn find_by_id(&self, id: ContactId) -> Result<Contact, StoreError> {
        self.contacts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_one(&self, filter: &ContactFilter) -> Result<Option<Contact>, StoreError> {
        let contacts = self.contacts.read().await;
        Ok(contacts
            .values()
            .filter(|c| filter.matches(c))
            .min_by(|a, b| compare(a, b, SortField::CreatedAt))
            .cloned())
    }

    async fn find_many(
        &self,
        filter: &ContactFilter,
        sort: ContactSort,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Contact>, StoreError> {
        let contacts = self.contacts.read().await;
        let mut matching: Vec<&Contact> = contacts.values().filter(|c| filter.matches(c)).collect();
        matching.sort_by(|a, b| {
            let ordering = compare(a, b, sort.field);
            if sort.order.is_ascending() {
                ordering
            } else {
                ordering.reverse()
            }
        });

        Ok(matching
            .into_iter()
            .skip(to_index(skip))
            .take(to_index(limit))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &ContactFilter) -> Result<u64, StoreError> {
        let contacts = self.contacts.read().await;
        let count = contacts.values().filter(|c| filter.matches(c)).count();
        Ok(count as u64)
    }

    async fn update_by_id(
        &self,
        id: ContactId,
        changes: ContactChanges,
    ) -> Result<Contact, StoreError> {
        let mut contacts = self.contacts.write().await;
        if let Some(email) = &changes.email
            && contacts.values().any(|c| c.id != id && c.email == *email)
        {
            return Err(StoreError::ConstraintViolation(
                "email already exists".to_owned(),
            ));
        }

        let contact = contacts.get_mut(&id).ok_or(StoreError::NotFound)?;
        changes.apply_to(contact);
        contact.updated_at = Utc::now().max(contact.created_at);

        tracing::debug!(contact_id = %id, "Updated contact");
        Ok(contact.clone())
    }

    async fn delete_by_id(&self, id: ContactId) -> Result<Contact, StoreError> {
        let removed = self
            .contacts
            .write()
            .await
            .remove(&id)
            .ok_or(StoreError::NotFound)?;

        tracing::debug!(contact_id = %id, "Deleted contact");
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
