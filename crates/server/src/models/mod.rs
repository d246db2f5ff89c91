//! Domain models for the contact book.
//!
//! These types represent validated domain objects; request bodies are
//! converted into them by the service layer.

pub mod contact;

pub use contact::{Contact, ContactChanges, ContactInput, NewContact};
