//! Database connection setup.
//!
//! The sequencer opens short-lived single connections rather than a pool:
//! each phase connects, does its work, and disconnects before the process
//! replaces itself with the application server.

use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use sqlx::{ConnectOptions, Connection};

use crate::config::{LocalConfig, RemoteConfig, LOCAL_DB_PORT};
use crate::error::Result;

/// Connection options for the co-located database, as the application account.
///
/// Connects over loopback TCP rather than the control socket so the account's
/// wildcard host grant applies, same as the application's own connections.
pub fn local_options(config: &LocalConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host("127.0.0.1")
        .port(LOCAL_DB_PORT)
        .username(&config.db_user)
        .password(&config.db_pass)
        .database(&config.db_name)
        .charset("utf8mb4")
}

/// Connection options for a managed database, as the application account.
pub fn remote_options(config: &RemoteConfig) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(&config.db_host)
        .port(config.db_port)
        .username(&config.db_user)
        .password(&config.db_pass)
        .database(&config.db_name)
        .charset("utf8mb4");
    if let Some(ca) = &config.db_ssl_ca {
        options = options.ssl_mode(MySqlSslMode::VerifyCa).ssl_ca(ca);
    }
    options
}

/// Open a connection, round-trip a trivial query, and close it again.
pub async fn ping(options: MySqlConnectOptions) -> Result<()> {
    let mut conn = options.connect().await?;
    sqlx::query("SELECT 1").execute(&mut conn).await?;
    conn.close().await?;
    Ok(())
}
