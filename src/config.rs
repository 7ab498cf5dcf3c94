use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::time::Duration;

use crate::logging::LogConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub log: LogConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub connection: ConnectionConfig,
    pub pool: PoolConfig,
}

/// Where and as whom to connect
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub username: String,
    pub password: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub ssl: bool,
}

// Never print the password.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("username", &self.username)
            .field("password", &"*********")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("ssl", &self.ssl)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_open_connections: u32,
    pub max_idle_connections: u32,
    pub max_lifetime: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_open_connections: 5,
            max_idle_connections: 3,
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            log: LogConfig::from_env().context("invalid logging configuration")?,
            database: DatabaseConfig {
                connection: ConnectionConfig {
                    username: env::var("DB_USER").unwrap_or_else(|_| "pguser".to_string()),
                    password: env::var("DB_PASS").unwrap_or_else(|_| "pgpass".to_string()),
                    name: env::var("DB_NAME").unwrap_or_else(|_| "postgres".to_string()),
                    host: env::var("DB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                    port: env::var("DB_PORT")
                        .unwrap_or_else(|_| "5432".to_string())
                        .parse()
                        .context("DB_PORT must be a valid port number")?,
                    ssl: env::var("USE_SSL_DB")
                        .unwrap_or_else(|_| "false".to_string())
                        .parse()
                        .context("USE_SSL_DB must be true or false")?,
                },
                pool: PoolConfig {
                    max_open_connections: env::var("DB_MAX_OPEN_CONNS")
                        .unwrap_or_else(|_| "5".to_string())
                        .parse()
                        .context("DB_MAX_OPEN_CONNS must be a valid number")?,
                    max_idle_connections: env::var("DB_IDLE_OPEN_CONNS")
                        .unwrap_or_else(|_| "3".to_string())
                        .parse()
                        .context("DB_IDLE_OPEN_CONNS must be a valid number")?,
                    max_lifetime: Duration::from_secs(
                        env::var("DB_MAX_LIFETIME_CONNS")
                            .unwrap_or_else(|_| "1800".to_string())
                            .parse()
                            .context("DB_MAX_LIFETIME_CONNS must be a number of seconds")?,
                    ),
                },
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogFormat, LogLevel};
    use std::sync::Mutex;

    fn connection() -> ConnectionConfig {
        ConnectionConfig {
            username: "app".to_string(),
            password: "s3cret".to_string(),
            name: "widgets".to_string(),
            host: "db.internal".to_string(),
            port: 5432,
            ssl: false,
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let printed = format!("{:?}", connection());
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("db.internal"));
    }

    // Tests below mutate process environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 4] = ["LOG_FORMAT", "LOG_LEVEL", "DB_PORT", "USE_SSL_DB"];

    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for key in VARS {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = f();
        for key in VARS {
            env::remove_var(key);
        }
        result
    }

    #[test]
    fn test_from_env_reads_variables() {
        let config = with_env(
            &[
                ("LOG_FORMAT", "json"),
                ("LOG_LEVEL", "warn"),
                ("DB_PORT", "6543"),
                ("USE_SSL_DB", "true"),
            ],
            Config::from_env,
        )
        .unwrap();

        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, LogLevel::Warn);
        assert_eq!(config.database.connection.port, 6543);
        assert!(config.database.connection.ssl);
    }

    #[test]
    fn test_from_env_rejects_unknown_log_format() {
        let err = with_env(&[("LOG_FORMAT", "devslog")], Config::from_env).unwrap_err();
        assert!(format!("{:#}", err).contains("devslog"));
    }

    #[test]
    fn test_from_env_rejects_bad_port() {
        let err = with_env(&[("DB_PORT", "not-a-port")], Config::from_env).unwrap_err();
        assert!(err.to_string().contains("DB_PORT"));
    }

    #[test]
    fn test_pool_defaults() {
        let pool = PoolConfig::default();
        assert_eq!(pool.max_open_connections, 5);
        assert_eq!(pool.max_idle_connections, 3);
        assert_eq!(pool.max_lifetime, Duration::from_secs(1800));
    }
}
