//! `PostgreSQL` contact store.
//!
//! Queries are built at runtime with `QueryBuilder` because the filter and
//! sort clauses vary per request. Sort columns come from a closed enum and
//! are never taken from user input.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use contact_book_core::{ContactId, ContactSort, SortField};

use super::{ContactFilter, ContactStore, StoreError};
use crate::models::{Contact, ContactChanges, NewContact};

const CONTACT_COLUMNS: &str = "id, name, email, phone, created_at, updated_at";

/// Searchable words of a row: every run of non-alphanumerics becomes a
/// word break, so the parts of an email or phone number are separate words.
///
/// Must match the expression of `contacts_search_idx`.
const SEARCH_DOCUMENT: &str = "to_tsvector('simple', regexp_replace(name || ' ' || email || ' ' || phone, '[^[:alnum:]]+', ' ', 'g'))";

/// Contact store backed by the `contacts` table.
#[derive(Clone)]
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    /// Create a new contact store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Name => "name",
        SortField::Email => "email",
        SortField::Phone => "phone",
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
    }
}

/// Append a `WHERE` clause for `filter` (nothing for the empty filter).
fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &ContactFilter) {
    let mut keyword = " WHERE ";

    if filter.search.is_some() {
        let terms = filter.search_terms();
        query.push(keyword);
        if terms.is_empty() {
            // Only punctuation: no word can match
            query.push("FALSE");
        } else {
            // plainto_tsquery ANDs the words; swap to OR so any word matches
            query
                .push(SEARCH_DOCUMENT)
                .push(" @@ replace(plainto_tsquery('simple', ")
                .push_bind(terms.join(" "))
                .push(")::text, ' & ', ' | ')::tsquery");
        }
        keyword = " AND ";
    }
    if let Some(email) = &filter.email {
        query
            .push(keyword)
            .push("lower(email) = ")
            .push_bind(email.as_str().to_owned());
        keyword = " AND ";
    }
    if let Some(id) = filter.exclude_id {
        query.push(keyword).push("id <> ").push_bind(id);
        keyword = " AND ";
    }
    if let Some(since) = filter.created_since {
        query.push(keyword).push("created_at >= ").push_bind(since);
    }
}

fn push_order(query: &mut QueryBuilder<'_, Postgres>, sort: ContactSort) {
    let direction = if sort.order.is_ascending() {
        "ASC"
    } else {
        "DESC"
    };
    query.push(format!(
        " ORDER BY {column} {direction}, id {direction}",
        column = sort_column(sort.field),
    ));
}

fn to_sql_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Map unique violations on the email index to `ConstraintViolation`.
fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StoreError::ConstraintViolation("email already exists".to_owned());
    }
    StoreError::Database(e)
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn insert(&self, contact: NewContact) -> Result<Contact, StoreError> {
        let created = sqlx::query_as::<_, Contact>(&format!(
            "INSERT INTO contacts (name, email, phone) VALUES ($1, $2, $3) RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        tracing::debug!(contact_id = %created.id, "Inserted contact");
        Ok(created)
    }

    async fn find_by_id(&self, id: ContactId) -> Result<Contact, StoreError> {
        sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn find_one(&self, filter: &ContactFilter) -> Result<Option<Contact>, StoreError> {
        let mut query = QueryBuilder::new(format!("SELECT {CONTACT_COLUMNS} FROM contacts"));
        push_filter(&mut query, filter);
        query.push(" ORDER BY created_at, id LIMIT 1");

        let contact = query
            .build_query_as::<Contact>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(contact)
    }

    async fn find_many(
        &self,
        filter: &ContactFilter,
        sort: ContactSort,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Contact>, StoreError> {
        let mut query = QueryBuilder::new(format!("SELECT {CONTACT_COLUMNS} FROM contacts"));
        push_filter(&mut query, filter);
        push_order(&mut query, sort);
        query
            .push(" LIMIT ")
            .push_bind(to_sql_count(limit))
            .push(" OFFSET ")
            .push_bind(to_sql_count(skip));

        let contacts = query
            .build_query_as::<Contact>()
            .fetch_all(&self.pool)
            .await?;
        Ok(contacts)
    }

    async fn count(&self, filter: &ContactFilter) -> Result<u64, StoreError> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM contacts");
        push_filter(&mut query, filter);

        let (count,): (i64,) = query.build_query_as().fetch_one(&self.pool).await?;
        u64::try_from(count)
            .map_err(|_| StoreError::DataCorruption(format!("negative row count: {count}")))
    }

    async fn update_by_id(
        &self,
        id: ContactId,
        changes: ContactChanges,
    ) -> Result<Contact, StoreError> {
        let updated = sqlx::query_as::<_, Contact>(&format!(
            r"
            UPDATE contacts
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                updated_at = GREATEST(NOW(), created_at)
            WHERE id = $1
            RETURNING {CONTACT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(StoreError::NotFound)?;

        tracing::debug!(contact_id = %updated.id, "Updated contact");
        Ok(updated)
    }

    async fn delete_by_id(&self, id: ContactId) -> Result<Contact, StoreError> {
        let deleted = sqlx::query_as::<_, Contact>(&format!(
            "DELETE FROM contacts WHERE id = $1 RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        tracing::debug!(contact_id = %deleted.id, "Deleted contact");
        Ok(deleted)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
