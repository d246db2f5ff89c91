//! Contact Book Core - Shared types library.
//!
//! This crate provides the domain types used across the contact book:
//! - `server` - REST API over the contact store
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Contact IDs, normalized emails, sort keys and pagination

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
