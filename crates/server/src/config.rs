//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (postgres store only)
//! - `CONTACTS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `CONTACTS_STORE` - `postgres` or `memory` (default: postgres)
//! - `CONTACTS_HOST` - Bind address (default: 127.0.0.1)
//! - `CONTACTS_PORT` - Listen port (falls back to `PORT`, default: 5000)
//! - `CONTACTS_ENV` - `development`, `test` or `production` (default: development)
//! - `CONTACTS_CORS_ORIGINS` - Comma-separated allowed origins (default: any origin)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    /// Whether 500 responses may carry the underlying error text.
    #[must_use]
    pub const fn exposes_error_detail(self) -> bool {
        !matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Test => write!(f, "test"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            _ => Err(format!("invalid environment: {s}")),
        }
    }
}

/// Which contact store backs the API.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// `PostgreSQL` (connection string contains the password).
    Postgres { database_url: SecretString },
    /// Process-local store; contents vanish on restart.
    Memory,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Contact store backend
    pub store: StoreBackend,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env
            .or_default("CONTACTS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CONTACTS_HOST".to_string(), e.to_string()))?;
        let port = env
            .get("CONTACTS_PORT")
            .or_else(|| env.get("PORT"))
            .unwrap_or_else(|| "5000".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CONTACTS_PORT".to_string(), e.to_string()))?;
        let environment = env
            .or_default("CONTACTS_ENV", "development")
            .parse::<Environment>()
            .map_err(|e| ConfigError::InvalidEnvVar("CONTACTS_ENV".to_string(), e))?;

        let store = match env.or_default("CONTACTS_STORE", "postgres").as_str() {
            "postgres" => StoreBackend::Postgres {
                database_url: env.database_url(DATABASE_URL_KEY)?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "CONTACTS_STORE".to_string(),
                    format!("expected postgres or memory, got {other}"),
                ));
            }
        };

        let cors_origins = env
            .get("CONTACTS_CORS_ORIGINS")
            .map(|raw| parse_list(&raw))
            .unwrap_or_default();
        let sentry_dsn = env.get("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            environment,
            store,
            cors_origins,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Load only the `PostgreSQL` connection string, for tools that never serve
/// HTTP.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither `CONTACTS_DATABASE_URL`
/// nor `DATABASE_URL` is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    let _ = dotenvy::dotenv();
    database_url_from_lookup(|key| std::env::var(key).ok())
}

/// [`database_url_from_env`] through an arbitrary variable lookup.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if no connection string is set.
pub fn database_url_from_lookup<F>(lookup: F) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Env(lookup).database_url(DATABASE_URL_KEY)
}

const DATABASE_URL_KEY: &str = "CONTACTS_DATABASE_URL";

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup that treats empty values as unset.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.get(primary_key)
            .or_else(|| self.get("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
