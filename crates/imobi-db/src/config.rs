//! # Database Configuration
//!
//! Pool settings, built in code or loaded from `IMOBI_*` environment
//! variables with fallback to defaults.
//!
//! | Variable                        | Default           |
//! |---------------------------------|-------------------|
//! | `IMOBI_DATABASE_PATH`           | `./imobi_dev.db`  |
//! | `IMOBI_DB_MAX_CONNECTIONS`      | `5`               |
//! | `IMOBI_DB_MIN_CONNECTIONS`      | `1`               |
//! | `IMOBI_DB_CONNECT_TIMEOUT_SECS` | `30`              |
//! | `IMOBI_DB_BUSY_TIMEOUT_SECS`    | `5`               |
//! | `IMOBI_LISTING_CODE_ATTEMPTS`   | `5`               |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default database file for development.
pub const DEFAULT_DATABASE_PATH: &str = "./imobi_dev.db";

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/imobi.db")
///     .max_connections(5)
///     .listing_code_attempts(3);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// How long a writer waits for the SQLite write lock before failing
    /// with "database is locked".
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,

    /// How many times listing creation retries after losing a code race.
    /// Default: 5
    pub listing_code_attempts: u32,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
            listing_code_attempts: 5,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the write lock wait.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Sets the listing code retry budget (at least one attempt).
    pub fn listing_code_attempts(mut self, attempts: u32) -> Self {
        self.listing_code_attempts = attempts.max(1);
        self
    }

    /// Creates an in-memory database configuration (for testing).
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
            listing_code_attempts: 5,
        }
    }

    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup("IMOBI_DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());
        let defaults = DbConfig::new(path);

        let config = DbConfig {
            max_connections: parse_var(&lookup, "IMOBI_DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: parse_var(&lookup, "IMOBI_DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connect_timeout: Duration::from_secs(parse_var(
                &lookup,
                "IMOBI_DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout.as_secs(),
            )?),
            busy_timeout: Duration::from_secs(parse_var(
                &lookup,
                "IMOBI_DB_BUSY_TIMEOUT_SECS",
                defaults.busy_timeout.as_secs(),
            )?),
            listing_code_attempts: parse_var(
                &lookup,
                "IMOBI_LISTING_CODE_ATTEMPTS",
                defaults.listing_code_attempts,
            )?,
            ..defaults
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("IMOBI_DB_MAX_CONNECTIONS".to_string()));
        }
        if config.min_connections > config.max_connections {
            return Err(ConfigError::InvalidValue("IMOBI_DB_MIN_CONNECTIONS".to_string()));
        }
        if config.listing_code_attempts == 0 {
            return Err(ConfigError::InvalidValue("IMOBI_LISTING_CODE_ATTEMPTS".to_string()));
        }

        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
