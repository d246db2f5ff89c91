//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::ContactStore;
use crate::services::ContactService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the immutable configuration and the
/// contact store handle.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    store: Arc<dyn ContactStore>,
    contacts: ContactService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AppConfig, store: Arc<dyn ContactStore>) -> Self {
        let contacts = ContactService::new(Arc::clone(&store));
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                contacts,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the contact store.
    #[must_use]
    pub fn store(&self) -> &dyn ContactStore {
        self.inner.store.as_ref()
    }

    /// Get the contact service.
    #[must_use]
    pub fn contacts(&self) -> &ContactService {
        &self.inner.contacts
    }

    /// Whether 500 responses may include the underlying error text.
    #[must_use]
    pub fn exposes_error_detail(&self) -> bool {
        self.inner.config.environment.exposes_error_detail()
    }
}
