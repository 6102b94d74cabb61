//! Configuration loaded from environment variables with sensible defaults.

use std::env;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Store selection.
    pub store: StoreConfig,
    /// Authentication settings.
    pub auth: AuthConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

/// Store selection: PostgreSQL when `DATABASE_URL` is set, in-memory
/// otherwise.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// PostgreSQL connection URL, if configured.
    pub database_url: Option<String>,
    /// Whether to seed demo data into a fresh in-memory store.
    pub seed_demo: bool,
}

/// Authentication settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Static token spec (`token=uuid:role`, comma-separated) for the
    /// development session provider.
    pub static_tokens: String,
}

impl Config {
    /// Loads configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|value| value.parse().ok())
                    .unwrap_or(3000),
            },
            store: StoreConfig {
                database_url: env::var("DATABASE_URL").ok(),
                seed_demo: env::var("EVENTEASE_SEED_DEMO")
                    .map(|value| value == "true" || value == "1")
                    .unwrap_or(false),
            },
            auth: AuthConfig {
                static_tokens: env::var("AUTH_STATIC_TOKENS").unwrap_or_default(),
            },
        }
    }
}
