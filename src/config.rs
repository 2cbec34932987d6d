//! Application configuration loaded from environment variables.
//!
//! Two deployment variants exist: `LocalConfig` for the self-contained image
//! that runs its own MariaDB instance, and `RemoteConfig` for the image that
//! points at a managed database. Filesystem paths and system account names
//! are baked into the image and are deliberately not configurable.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{BootError, Result};

/// Application checkout directory inside the container
pub const APP_DIR: &str = "/app";

/// MariaDB data directory (local variant)
pub const DATA_DIR: &str = "/var/lib/mysql";

/// Directory holding the MariaDB control socket (local variant)
pub const SOCKET_DIR: &str = "/run/mysqld";

/// MariaDB control socket path (local variant)
pub const SOCKET_PATH: &str = "/run/mysqld/mysqld.sock";

/// Port the co-located database server listens on (local variant)
pub const LOCAL_DB_PORT: u16 = 3306;

/// System account the database server runs as
pub const MYSQL_ACCOUNT: &str = "mysql";

/// Unprivileged system account the application server runs as
pub const APP_ACCOUNT: &str = "appuser";

/// Port the application server binds on all interfaces
pub const HTTP_PORT: u16 = 8000;

/// Poll interval while waiting for the co-located database
pub const LOCAL_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll interval while waiting for a managed database
pub const REMOTE_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Connection attempts against a managed database before giving up
pub const REMOTE_MAX_ATTEMPTS: u32 = 20;

const DEFAULT_DB_NAME: &str = "ficha_medica";
const DEFAULT_DB_USER: &str = "appuser";
const DEFAULT_DB_PASS: &str = "apppass";
const DEFAULT_ROOT_PASSWORD: &str = "rootpass";
const DEFAULT_DB_PORT: u16 = 3306;

/// Configuration for the self-contained variant
#[derive(Clone)]
pub struct LocalConfig {
    /// Schema created for the application
    pub db_name: String,

    /// Application database account
    pub db_user: String,

    /// Application database password
    pub db_pass: String,

    /// Password assigned to the database root account
    pub root_password: String,
}

redacted_debug!(LocalConfig {
    show db_name,
    show db_user,
    redact db_pass,
    redact root_password,
});

impl LocalConfig {
    /// Load configuration from environment variables. Every variable has a
    /// development default, so this cannot fail.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| {
            get(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            db_name: var("DB_NAME", DEFAULT_DB_NAME),
            db_user: var("DB_USER", DEFAULT_DB_USER),
            db_pass: var("DB_PASS", DEFAULT_DB_PASS),
            root_password: var("MYSQL_ROOT_PASSWORD", DEFAULT_ROOT_PASSWORD),
        }
    }
}

/// Configuration for the managed-database variant
#[derive(Clone)]
pub struct RemoteConfig {
    /// Database server hostname
    pub db_host: String,

    /// Database server port
    pub db_port: u16,

    /// Application database account
    pub db_user: String,

    /// Application database password
    pub db_pass: String,

    /// Schema the application uses
    pub db_name: String,

    /// CA bundle for TLS verification (optional)
    pub db_ssl_ca: Option<PathBuf>,
}

redacted_debug!(RemoteConfig {
    show db_host,
    show db_port,
    show db_user,
    redact db_pass,
    show db_name,
    show db_ssl_ca,
});

impl RemoteConfig {
    /// Load configuration from environment variables. Connection coordinates
    /// have no sane defaults here, so missing variables are fatal.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            get(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| BootError::Config(format!("{key} not set")))
        };
        let db_port = match get("DB_PORT").filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .parse()
                .map_err(|_| BootError::Config(format!("DB_PORT is not a valid port: {raw}")))?,
            None => DEFAULT_DB_PORT,
        };
        Ok(Self {
            db_host: required("DB_HOST")?,
            db_port,
            db_user: required("DB_USER")?,
            db_pass: required("DB_PASS")?,
            db_name: required("DB_NAME")?,
            db_ssl_ca: get("DB_SSL_CA").filter(|v| !v.is_empty()).map(PathBuf::from),
        })
    }
}
