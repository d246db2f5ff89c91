//! Core types for the contact book.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod page;
pub mod sort;

pub use email::{Email, EmailError};
pub use id::ContactId;
pub use page::PageRequest;
pub use sort::{ContactSort, SortField, SortOrder};
