use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use crate::config::{ConnectionConfig, DatabaseConfig};

const PING_TIMEOUT: Duration = Duration::from_secs(4);

/// CA bundle location of the Alpine `ca-certificates` package
const SSL_ROOT_CERT: &str = "/etc/ssl/cert.pem";

/// Postgres connection URL for `config`
pub fn connection_url(config: &ConnectionConfig) -> String {
    let ssl_mode = if config.ssl {
        format!("verify-ca&sslrootcert={SSL_ROOT_CERT}")
    } else {
        "disable".to_string()
    };

    format!(
        "postgres://{}:{}@{}:{}/{}?sslmode={}",
        urlencoding::encode(&config.username),
        urlencoding::encode(&config.password),
        config.host,
        config.port,
        urlencoding::encode(&config.name),
        ssl_mode
    )
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    info!(connection = ?config.connection, "Connecting to database");

    let pool = PgPoolOptions::new()
        .max_connections(config.pool.max_open_connections)
        .min_connections(config.pool.max_idle_connections)
        .max_lifetime(config.pool.max_lifetime)
        .acquire_timeout(PING_TIMEOUT)
        .connect(&connection_url(&config.connection))
        .await
        .context("Failed to create database connection pool")?;

    info!(
        max_open_connections = config.pool.max_open_connections,
        max_idle_connections = config.pool.max_idle_connections,
        max_lifetime_secs = config.pool.max_lifetime.as_secs(),
        "Database pool configured"
    );

    tokio::time::timeout(PING_TIMEOUT, test_connection(&pool))
        .await
        .context("Timed out pinging database")??;

    Ok(pool)
}

pub async fn test_connection(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .context("Failed to test database connection")?;
    Ok(())
}
