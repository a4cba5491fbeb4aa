//! Environment-driven configuration
//!
//! Loads `.env` via dotenvy and validates required variables up front,
//! reporting every missing variable in a single error so initial setup
//! problems surface immediately rather than one variable at a time.

use std::env;
use std::time::Duration;

use crate::errors::{ErrorKind, Result, SnapError};

/// Required database environment variables.
const REQUIRED_DB_VARS: [&str; 4] = ["DB_HOST", "DB_USER", "DB_PASSWORD", "DB_NAME"];

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Fixed connection timeout; the only timeout in the pipeline
    pub connect_timeout: Duration,
    pub pool_size: u32,
}

/// Git sync settings.
#[derive(Debug, Clone)]
pub struct GitConfig {
    /// Target branch (created/reset if the checkout is elsewhere)
    pub branch: String,
    /// Allow empty commits so a no-change run still advances history
    pub allow_empty: bool,
    /// Run a one-shot sync when the HTTP server starts
    pub push_on_start: bool,
    /// Default for the export command when no --push/--no-push flag is given
    pub push_on_run: bool,
}

/// Process-wide configuration derived from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub git: GitConfig,
    /// Directory receiving `{name}.json` snapshot files
    pub data_dir: String,
}

impl Config {
    /// Load configuration from the environment (after a best-effort `.env`
    /// load). Fails with `ERR_MISSING_ENV_VAR` listing every absent
    /// required variable.
    pub fn from_env() -> Result<Self> {
        // Missing .env is fine; variables may come from the real environment.
        let _ = dotenvy::dotenv();

        let missing: Vec<&str> = REQUIRED_DB_VARS
            .iter()
            .filter(|key| env::var(key).map(|v| v.is_empty()).unwrap_or(true))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(SnapError::new(ErrorKind::MissingEnvVar)
                .with_op("config_from_env")
                .with_message(format!(
                    "Missing required environment variables: {}",
                    missing.join(", ")
                )));
        }

        let db = DbConfig {
            host: env::var("DB_HOST").unwrap_or_default(),
            port: parse_var("DB_PORT", 3306)?,
            user: env::var("DB_USER").unwrap_or_default(),
            password: env::var("DB_PASSWORD").unwrap_or_default(),
            database: env::var("DB_NAME").unwrap_or_default(),
            connect_timeout: Duration::from_secs(parse_var("DB_CONN_TIMEOUT", 10u64)?),
            pool_size: 5,
        };

        let git = GitConfig {
            branch: env::var("GIT_BRANCH").unwrap_or_else(|_| "main".to_string()),
            allow_empty: true,
            push_on_start: bool_var("PUSH_ON_START"),
            push_on_run: bool_var("PUSH_ON_RUN"),
        };

        Ok(Self {
            db,
            git,
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| crate::job::SNAPSHOT_DIR.to_string()),
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) if !raw.is_empty() => raw.parse().map_err(|_| {
            SnapError::new(ErrorKind::MissingEnvVar)
                .with_op("config_from_env")
                .with_message(format!("Invalid value for {}: {}", key, raw))
        }),
        _ => Ok(default),
    }
}

/// Boolean env flag: "1", "true", "yes", "y" (case-insensitive) are truthy.
fn bool_var(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "y"))
        .unwrap_or(false)
}
