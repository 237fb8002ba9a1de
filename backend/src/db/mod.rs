//! Database connection and pool management
//!
//! Pool creation, migrations and the readiness probe query.

use crate::config::DatabaseConfig;
use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Name reported to PostgreSQL in `pg_stat_activity`
const APPLICATION_NAME: &str = "address-book";

/// Pool tuning
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,  // 10 minutes
            max_lifetime_secs: 1800, // 30 minutes
        }
    }
}

impl From<&DatabaseConfig> for DbConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            ..Default::default()
        }
    }
}

/// Create a PostgreSQL connection pool from application config
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    create_pool_with_config(&DbConfig::from(config)).await
}

/// Create a PostgreSQL connection pool with explicit tuning
pub async fn create_pool_with_config(config: &DbConfig) -> Result<PgPool> {
    let connect_options =
        PgConnectOptions::from_str(&config.url)?.application_name(APPLICATION_NAME);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await?;

    info!(
        max = config.max_connections,
        min = config.min_connections,
        "database pool created"
    );

    Ok(pool)
}

/// Apply pending migrations (users and contacts tables)
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("database migrations completed");
    Ok(())
}

/// Round-trip a trivial query
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!("database health check failed: {}", e);
            e.into()
        })
}
