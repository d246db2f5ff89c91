//! `PgContactStore` against a live `PostgreSQL` database.
//!
//! These tests require a disposable database; every test truncates the
//! `contacts` table. Run with:
//!
//! ```bash
//! CONTACTS_TEST_DATABASE_URL=postgres://localhost/contacts_test \
//!     cargo test -p contact-book-integration-tests -- --ignored --test-threads=1
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;

use secrecy::SecretString;

use contact_book_core::{ContactId, ContactSort, Email, SortField, SortOrder};
use contact_book_server::db::{self, ContactFilter, ContactStore, PgContactStore, StoreError};
use contact_book_server::models::{ContactChanges, ContactInput, NewContact};
use contact_book_server::services::{ContactError, ContactService};

async fn store() -> PgContactStore {
    let url = std::env::var("CONTACTS_TEST_DATABASE_URL")
        .expect("CONTACTS_TEST_DATABASE_URL must point at a disposable database");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    sqlx::query("TRUNCATE contacts")
        .execute(&pool)
        .await
        .expect("Failed to truncate contacts");

    PgContactStore::new(pool)
}

fn new_contact(name: &str, email: &str, phone: &str) -> NewContact {
    NewContact {
        name: name.to_string(),
        email: Email::parse(email).unwrap(),
        phone: phone.to_string(),
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_insert_and_find() {
    let store = store().await;

    let ada = store.insert(new_contact("Ada", "ada@x.com", "1")).await.unwrap();
    assert_eq!(ada.created_at, ada.updated_at);
    assert_eq!(store.find_by_id(ada.id).await.unwrap(), ada);

    let missing = store.find_by_id(ContactId::generate()).await;
    assert!(matches!(missing, Err(StoreError::NotFound)));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_unique_email_index() {
    let store = store().await;
    store.insert(new_contact("Ada", "ada@x.com", "1")).await.unwrap();

    let err = store
        .insert(new_contact("Other", "ADA@x.com", "2"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation(_)));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_search_sort_and_page() {
    let store = store().await;
    store.insert(new_contact("Ada Lovelace", "ada@x.com", "111")).await.unwrap();
    store.insert(new_contact("Grace Hopper", "grace@x.com", "222")).await.unwrap();
    store.insert(new_contact("Alan Turing", "alan@x.com", "333")).await.unwrap();

    let filter = ContactFilter::search("hopper turing");
    assert_eq!(store.count(&filter).await.unwrap(), 2);

    let sort = ContactSort::new(SortField::Name, SortOrder::Asc);
    let page = store.find_many(&filter, sort, 0, 10).await.unwrap();
    let names: Vec<_> = page.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Alan Turing", "Grace Hopper"]);

    let page = store
        .find_many(&ContactFilter::all(), sort, 1, 1)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name, "Alan Turing");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_search_matches_email_and_phone_fragments() {
    let store = store().await;
    store
        .insert(new_contact("Ada Lovelace", "ada.lovelace@gmail.com", "555-0101"))
        .await
        .unwrap();
    store
        .insert(new_contact("Grace Hopper", "grace@navy.mil", "555-0199"))
        .await
        .unwrap();

    for search in ["gmail", "lovelace", "0101", "GMAIL.com"] {
        let filter = ContactFilter::search(search);
        assert_eq!(store.count(&filter).await.unwrap(), 1, "search {search:?}");
    }
    assert_eq!(store.count(&ContactFilter::search("555")).await.unwrap(), 2);
    assert_eq!(store.count(&ContactFilter::search("@-.")).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_update_refreshes_updated_at() {
    let store = store().await;
    let ada = store.insert(new_contact("Ada", "ada@x.com", "1")).await.unwrap();

    let changes = ContactChanges {
        phone: Some("999".to_string()),
        ..Default::default()
    };
    let updated = store.update_by_id(ada.id, changes).await.unwrap();

    assert_eq!(updated.phone, "999");
    assert_eq!(updated.name, ada.name);
    assert_eq!(updated.created_at, ada.created_at);
    assert!(updated.updated_at >= ada.updated_at);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_delete_returns_removed_contact() {
    let store = store().await;
    let ada = store.insert(new_contact("Ada", "ada@x.com", "1")).await.unwrap();

    assert_eq!(store.delete_by_id(ada.id).await.unwrap().id, ada.id);
    assert!(matches!(
        store.delete_by_id(ada.id).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_concurrent_creates_through_service() {
    let service = Arc::new(ContactService::new(Arc::new(store().await)));
    let input = ContactInput {
        name: Some("Twin".to_string()),
        email: Some("twin@x.com".to_string()),
        phone: Some("1".to_string()),
    };

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            let input = input.clone();
            tokio::spawn(async move { service.create(input).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert!(matches!(err, ContactError::DuplicateEmail)),
        }
    }
    assert_eq!(created, 1);
}
