//! Contact domain types.
//!
//! `Contact` is what the store persists and what the API returns.
//! `ContactInput` is the raw request body; it is validated into a
//! `NewContact` (create) or `ContactChanges` (update) before it reaches a
//! store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use contact_book_core::{ContactId, Email};

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Store-generated ID. Serialized as `_id`, the key the browser UI reads.
    #[serde(rename = "_id")]
    pub id: ContactId,
    pub name: String,
    /// Always lowercase.
    pub email: Email,
    pub phone: String,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update; never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
}

/// Request body for create and update.
///
/// Every field is optional at this layer so that missing fields are
/// reported as validation errors rather than deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A validated contact ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub email: Email,
    pub phone: String,
}

/// A validated partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
}

impl ContactChanges {
    /// Apply the supplied fields to `contact`, leaving the rest unchanged.
    ///
    /// Timestamps are the store's responsibility and are not touched here.
    pub fn apply_to(&self, contact: &mut Contact) {
        if let Some(name) = &self.name {
            contact.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            contact.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            contact.phone.clone_from(phone);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Contact {
        let now = Utc::now();
        Contact {
            id: ContactId::generate(),
            name: "Ada Lovelace".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            phone: "555-0100".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_contact_serializes_with_wire_names() {
        let contact = sample();
        let json = serde_json::to_value(&contact).unwrap();

        assert_eq!(json["_id"], contact.id.to_string());
        assert_eq!(json["email"], "ada@example.com");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("id").is_none());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_apply_only_supplied_fields() {
        let mut contact = sample();
        let changes = ContactChanges {
            phone: Some("999".to_string()),
            ..Default::default()
        };

        changes.apply_to(&mut contact);

        assert_eq!(contact.phone, "999");
        assert_eq!(contact.name, "Ada Lovelace");
        assert_eq!(contact.email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_input_accepts_partial_body() {
        let input: ContactInput = serde_json::from_str(r#"{"phone":"1"}"#).unwrap();
        assert!(input.name.is_none());
        assert_eq!(input.phone.as_deref(), Some("1"));
    }
}
