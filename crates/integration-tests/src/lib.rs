//! Integration tests for the contact book API.
//!
//! # Running Tests
//!
//! ```bash
//! # HTTP contract tests (in-memory store, no services needed)
//! cargo test -p contact-book-integration-tests
//!
//! # PostgreSQL store tests (need a disposable database)
//! CONTACTS_TEST_DATABASE_URL=postgres://localhost/contacts_test \
//!     cargo test -p contact-book-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `contacts_api` - REST contract through the full router
//! - `contacts_postgres` - `PgContactStore` against a live database

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use contact_book_server::config::AppConfig;
use contact_book_server::db::InMemoryContactStore;
use contact_book_server::state::AppState;

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body, or `Value::String` for non-JSON bodies.
    pub body: Value,
}

/// The full application router over a fresh in-memory store.
#[derive(Clone)]
pub struct TestContext {
    app: Router,
}

impl TestContext {
    /// Build the app with default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the test configuration is rejected.
    #[must_use]
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Build the app with extra configuration variables. The in-memory
    /// store is always used.
    ///
    /// # Panics
    ///
    /// Panics if the test configuration is rejected.
    #[must_use]
    pub fn with_env(vars: &[(&str, &str)]) -> Self {
        let config = AppConfig::from_lookup(|key| {
            if key == "CONTACTS_STORE" {
                return Some("memory".to_string());
            }
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        })
        .expect("test configuration should be valid");

        let state = AppState::new(
            config,
            std::sync::Arc::new(InMemoryContactStore::new()),
        );
        Self {
            app: contact_book_server::app(state),
        }
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        self.send(request).await
    }

    /// Send a prebuilt request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Create a contact and return its `_id`.
    ///
    /// # Panics
    ///
    /// Panics unless the API answers 201.
    pub async fn create_contact(&self, name: &str, email: &str, phone: &str) -> String {
        let response = self
            .post(
                "/api/contacts",
                serde_json::json!({ "name": name, "email": email, "phone": phone }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["data"]["_id"]
            .as_str()
            .expect("created contact should have an _id")
            .to_string()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
