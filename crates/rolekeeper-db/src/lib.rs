//! # rolekeeper-db
//!
//! Database layer for Rolekeeper. All state lives in **PostgreSQL**:
//! nickname rules and history, delegated permissions, exclusivity groups, and
//! role dependencies. Schema changes ship as embedded `sqlx` migrations.

pub mod postgres;
pub mod repository;

use anyhow::Result;
use rolekeeper_common::config::DatabaseConfig;
use sqlx::PgPool;
use std::time::Duration;

/// Connection pool handle.
///
/// Created once at startup with [`Database::connect`], cloned into whatever
/// needs it, and released with [`Database::close`] on shutdown.
#[derive(Clone)]
pub struct Database {
    pub pg: PgPool,
}

impl Database {
    /// Connect to PostgreSQL.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        tracing::info!(
            url = %postgres::redact_url(&config.url),
            "Connecting to PostgreSQL..."
        );
        let pg = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        tracing::info!("Connected to PostgreSQL");
        Ok(Self { pg })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pg: PgPool) -> Self {
        Self { pg }
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pg).await?;
        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Close every pooled connection. Pending queries finish first.
    pub async fn close(&self) {
        tracing::info!("Closing database pool...");
        self.pg.close().await;
        tracing::info!("Database pool closed");
    }
}
