//! Business logic services.

pub mod contacts;

pub use contacts::{
    ContactError, ContactPage, ContactService, ContactStats, FieldError, ListQuery,
};
