//! Application error types and result alias.

use std::process::ExitStatus;

use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, BootError>;

/// Startup sequence error types
#[derive(Error, Debug)]
pub enum BootError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database dependency never became reachable
    #[error("Database not reachable after {attempts} attempts: {source}")]
    DatabaseUnreachable {
        attempts: u32,
        #[source]
        source: Box<BootError>,
    },

    /// External command could not be started
    #[error("Failed to launch {program}: {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// External command ran and reported failure
    #[error("{program} exited with {status}: {output}")]
    CommandFailed {
        program: String,
        status: ExitStatus,
        output: String,
    },

    /// System account lookup failed
    #[error("Unknown system account: {0}")]
    UnknownAccount(String),

    /// Stored password hash could not be interpreted
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// HTTP probe error
    #[error("HTTP probe error: {0}")]
    Probe(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
