//! Runtime configuration.
//!
//! Precedence, lowest to highest: built-in defaults, environment
//! (`TRACKD_DB`, `TRACKD_BIND`, `TRACKD_LOCK_TIMEOUT`), CLI flags.

use crate::error::{Result, TrackerError};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "trackd.db";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
    /// Address the HTTP server binds to.
    pub bind: SocketAddr,
    /// SQLite busy timeout in milliseconds.
    pub lock_timeout_ms: Option<u64>,
}

/// Values supplied on the command line; `None` means not set.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub bind: Option<SocketAddr>,
    pub lock_timeout: Option<u64>,
}

impl Config {
    /// Assemble the configuration from defaults, environment, and CLI
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns a config error when an environment value fails to parse.
    pub fn load(overrides: &CliOverrides) -> Result<Self> {
        let db_path = overrides
            .db
            .clone()
            .or_else(|| std::env::var_os("TRACKD_DB").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let bind = if let Some(addr) = overrides.bind {
            addr
        } else {
            parse_bind(&std::env::var("TRACKD_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string()))?
        };

        let lock_timeout_ms = if overrides.lock_timeout.is_some() {
            overrides.lock_timeout
        } else {
            std::env::var("TRACKD_LOCK_TIMEOUT")
                .ok()
                .map(|raw| {
                    raw.parse::<u64>().map_err(|_| {
                        TrackerError::Config(format!("invalid TRACKD_LOCK_TIMEOUT: {raw}"))
                    })
                })
                .transpose()?
        };

        Ok(Self {
            db_path,
            bind,
            lock_timeout_ms,
        })
    }
}

fn parse_bind(raw: &str) -> Result<SocketAddr> {
    raw.parse()
        .map_err(|_| TrackerError::Config(format!("invalid bind address: {raw}")))
}
