//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > rolekeeper.toml > defaults

use config::builder::{ConfigBuilder, DefaultState};
use serde::Deserialize;
use std::time::Duration;

/// Default time an acting user has to answer a role-conflict prompt.
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 180;

/// Default interval between stale-role cleanup scans (one day).
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 86_400;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub grants: GrantsConfig,
    pub maintenance: MaintenanceConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Called once at startup; the result is passed down explicitly.
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let cfg = with_defaults(config::Config::builder())?
            // Optional config file
            .add_source(config::File::with_name("rolekeeper").required(false))
            // Environment variables (ROLEKEEPER__DATABASE__URL, etc.)
            .add_source(
                config::Environment::with_prefix("ROLEKEEPER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            // Hosting providers usually hand out a bare DATABASE_URL
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?;

        cfg.try_deserialize()
    }
}

/// Register every default so a config file or environment only needs the
/// database URL.
pub fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    builder
        .set_default("database.max_connections", 10)?
        .set_default("database.min_connections", 1)?
        .set_default("database.acquire_timeout_secs", 30)?
        .set_default(
            "grants.confirmation_timeout_secs",
            DEFAULT_CONFIRMATION_TIMEOUT_SECS,
        )?
        .set_default(
            "maintenance.cleanup_interval_secs",
            DEFAULT_CLEANUP_INTERVAL_SECS,
        )?
        .set_default("logging.filter", "rolekeeper=info")
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GrantsConfig {
    pub confirmation_timeout_secs: u64,
}

impl GrantsConfig {
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MaintenanceConfig {
    pub cleanup_interval_secs: u64,
}

impl MaintenanceConfig {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_everything_but_the_url() {
        let cfg: AppConfig = with_defaults(config::Config::builder())
            .unwrap()
            .set_override("database.url", "postgres://localhost/rolekeeper")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.database.url, "postgres://localhost/rolekeeper");
        assert_eq!(cfg.grants.confirmation_timeout(), Duration::from_secs(180));
        assert_eq!(cfg.maintenance.cleanup_interval(), Duration::from_secs(86_400));
        assert_eq!(cfg.logging.filter, "rolekeeper=info");
    }

    #[test]
    fn missing_url_is_an_error() {
        let result = with_defaults(config::Config::builder())
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>();
        assert!(result.is_err());
    }
}
