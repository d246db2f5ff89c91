//! HTTP route handlers for the contacts API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (store reachable)
//!
//! # Contacts
//! GET    /api/contacts         - List (search, sortBy, order, page, limit)
//! POST   /api/contacts         - Create
//! GET    /api/contacts/stats   - Dashboard totals
//! GET    /api/contacts/{id}    - Fetch one
//! PUT    /api/contacts/{id}    - Partial update
//! DELETE /api/contacts/{id}    - Delete
//! ```

pub mod contacts;
pub mod health;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the contact routes router.
pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(contacts::index).post(contacts::create))
        .route("/stats", get(contacts::stats))
        .route(
            "/{id}",
            get(contacts::show)
                .put(contacts::update)
                .delete(contacts::destroy),
        )
}

/// Create the health check router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api/contacts", contact_routes())
}
