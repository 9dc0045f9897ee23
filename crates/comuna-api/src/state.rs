//! # Application State
//!
//! Shared state for the axum application: configuration, the persistence
//! store, the optional database pool, and the command mediator. Cheaply
//! cloneable — all clones share the same store and registry.

use std::sync::Arc;

use sqlx::PgPool;

use comuna_app::memory::MemoryStore;
use comuna_app::{Mediator, Store};

use crate::db::PgStore;

/// Deployment environment, controlling error message disclosure.
///
/// Production responses never carry database or internal error detail;
/// development responses do. The flag is read once at startup and injected
/// wherever the mapping needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse from `COMUNA_ENVIRONMENT`. Anything other than `development`
    /// (including an unset variable) is treated as production, so detail
    /// disclosure is opt-in.
    pub fn from_env() -> Self {
        match std::env::var("COMUNA_ENVIRONMENT") {
            Ok(v) if v.eq_ignore_ascii_case("development") => Self::Development,
            _ => Self::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// Startup configuration, read from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Environment,
    pub metrics_enabled: bool,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        let port = std::env::var("COMUNA_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let metrics_enabled = std::env::var("COMUNA_METRICS_ENABLED")
            .map(|v| flag_enabled(&v))
            .unwrap_or(true);
        Self {
            port,
            environment: Environment::from_env(),
            metrics_enabled,
        }
    }
}

/// Parse a boolean env flag. `false`, `0`, `no`, and `off` disable;
/// everything else (including garbage) keeps the default-on behavior.
fn flag_enabled(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            environment: Environment::Production,
            metrics_enabled: true,
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn Store>,
    pub db_pool: Option<PgPool>,
    pub mediator: Arc<Mediator>,
}

impl AppState {
    /// In-memory state with default configuration (tests, local runs).
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Build state around a configuration and an optional database pool.
    ///
    /// With a pool the Postgres store backs all repositories; without one
    /// the service runs on the in-memory store and state does not survive
    /// restarts.
    pub fn with_config(config: AppConfig, pool: Option<PgPool>) -> Self {
        let store: Arc<dyn Store> = match &pool {
            Some(pool) => Arc::new(PgStore::new(pool.clone())),
            None => Arc::new(MemoryStore::new()),
        };
        let mediator = Arc::new(comuna_app::mediator(store.clone()));
        Self {
            config,
            store,
            db_pool: pool,
            mediator,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
