//! Local MariaDB instance management for the self-contained variant.
//!
//! Owns the database half of the startup sequence: ownership fixup on the
//! volume-mounted data directory, first-run initialization, launching the
//! server, pinging it over the control socket, and the credential/schema
//! setup. Every step is written to be safe to re-run, so a container restart
//! on an existing volume converges instead of failing.

use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::info;

use crate::config::{LocalConfig, DATA_DIR, MYSQL_ACCOUNT, SOCKET_DIR, SOCKET_PATH};
use crate::error::{BootError, Result};
use crate::unix;

/// A data directory is initialized once it contains the system catalog.
pub fn needs_init(data_dir: &Path) -> bool {
    !data_dir.join("mysql").is_dir()
}

/// Hand the data and socket directories to the database account.
///
/// Volumes mounted from the host arrive owned by arbitrary ids, and the
/// server refuses to start on a data directory it cannot write.
pub fn fix_ownership() -> Result<()> {
    let mysql = unix::lookup_account(MYSQL_ACCOUNT)?;
    unix::ensure_owned_dir(Path::new(DATA_DIR), mysql)?;
    unix::ensure_owned_dir(Path::new(SOCKET_DIR), mysql)?;
    Ok(())
}

/// Initialize the data directory on first run, skip otherwise.
///
/// Initialization leaves the root account on socket authentication with no
/// stored password; [`run_setup`] assigns one afterwards.
pub async fn initialize(data_dir: &Path) -> Result<()> {
    if !needs_init(data_dir) {
        info!(data_dir = %data_dir.display(), "data directory already initialized, skipping");
        return Ok(());
    }
    info!(data_dir = %data_dir.display(), "initializing database instance");
    let output = Command::new("mariadb-install-db")
        .arg(format!("--user={MYSQL_ACCOUNT}"))
        .arg(format!("--datadir={}", data_dir.display()))
        .arg("--skip-test-db")
        .output()
        .await
        .map_err(|e| BootError::CommandSpawn {
            program: "mariadb-install-db".to_string(),
            source: e,
        })?;
    if !output.status.success() {
        return Err(BootError::CommandFailed {
            program: "mariadb-install-db".to_string(),
            status: output.status,
            output: capture(&output.stdout, &output.stderr),
        });
    }
    info!("database instance initialized");
    Ok(())
}

/// Launch the database server in the background.
///
/// The child is deliberately never awaited: it must outlive this process,
/// which eventually replaces itself with the application server.
pub fn spawn_server() -> Result<Child> {
    info!("launching database server");
    Command::new("mysqld")
        .arg(format!("--user={MYSQL_ACCOUNT}"))
        .arg(format!("--datadir={DATA_DIR}"))
        .arg(format!("--socket={SOCKET_PATH}"))
        .arg("--bind-address=0.0.0.0")
        .spawn()
        .map_err(|e| BootError::CommandSpawn {
            program: "mysqld".to_string(),
            source: e,
        })
}

/// Liveness probe over the control socket.
pub async fn ping() -> Result<()> {
    let output = Command::new("mariadb-admin")
        .args(["--socket", SOCKET_PATH, "ping"])
        .output()
        .await
        .map_err(|e| BootError::CommandSpawn {
            program: "mariadb-admin".to_string(),
            source: e,
        })?;
    if output.status.success() {
        Ok(())
    } else {
        Err(BootError::CommandFailed {
            program: "mariadb-admin".to_string(),
            status: output.status,
            output: capture(&output.stdout, &output.stderr),
        })
    }
}

/// Assign the root password and create the application schema and account.
///
/// Runs through the `mariadb` client over the control socket, which
/// authenticates root by unix socket identity. That keeps the whole batch
/// re-runnable: a password assigned on a previous run does not lock the
/// sequencer out.
pub async fn run_setup(config: &LocalConfig) -> Result<()> {
    info!(
        db_name = %config.db_name,
        db_user = %config.db_user,
        "applying root credential and application schema"
    );
    let sql = setup_sql(config);
    let mut child = Command::new("mariadb")
        .args(["--socket", SOCKET_PATH, "-u", "root"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| BootError::CommandSpawn {
            program: "mariadb".to_string(),
            source: e,
        })?;

    // Statements go over stdin so credentials never appear in the process list.
    let mut stdin = child.stdin.take().expect("stdin was piped");
    stdin.write_all(sql.as_bytes()).await?;
    drop(stdin);

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        return Err(BootError::CommandFailed {
            program: "mariadb".to_string(),
            status: output.status,
            output: capture(&output.stdout, &output.stderr),
        });
    }
    Ok(())
}

/// Render the one-shot setup batch for the local instance.
///
/// `SET PASSWORD` keeps root's socket authentication alongside the password;
/// the remaining statements are guarded or naturally idempotent.
fn setup_sql(config: &LocalConfig) -> String {
    let db = escape_identifier(&config.db_name);
    let user = escape_literal(&config.db_user);
    let pass = escape_literal(&config.db_pass);
    let root = escape_literal(&config.root_password);
    format!(
        "SET PASSWORD FOR 'root'@'localhost' = PASSWORD('{root}');\n\
         CREATE DATABASE IF NOT EXISTS `{db}` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;\n\
         CREATE USER IF NOT EXISTS '{user}'@'%' IDENTIFIED BY '{pass}';\n\
         ALTER USER '{user}'@'%' IDENTIFIED BY '{pass}';\n\
         GRANT ALL PRIVILEGES ON `{db}`.* TO '{user}'@'%';\n\
         FLUSH PRIVILEGES;\n"
    )
}

/// Escape a string for interpolation inside a single-quoted SQL literal.
fn escape_literal(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Escape a name for interpolation inside a backtick-quoted identifier.
fn escape_identifier(raw: &str) -> String {
    raw.replace('`', "``")
}

fn capture(stdout: &[u8], stderr: &[u8]) -> String {
    let err = String::from_utf8_lossy(stderr);
    let err = err.trim();
    if err.is_empty() {
        String::from_utf8_lossy(stdout).trim().to_string()
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LocalConfig {
        LocalConfig {
            db_name: "ficha_medica".to_string(),
            db_user: "appuser".to_string(),
            db_pass: "apppass".to_string(),
            root_password: "rootpass".to_string(),
        }
    }

    #[test]
    fn test_needs_init_detects_missing_system_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(needs_init(tmp.path()));

        std::fs::create_dir(tmp.path().join("mysql")).unwrap();
        assert!(!needs_init(tmp.path()));
    }

    #[test]
    fn test_needs_init_ignores_plain_file_named_mysql() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("mysql"), b"").unwrap();
        assert!(needs_init(tmp.path()));
    }

    #[test]
    fn test_setup_sql_creates_schema_with_utf8mb4() {
        let sql = setup_sql(&test_config());
        assert!(sql.contains(
            "CREATE DATABASE IF NOT EXISTS `ficha_medica` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;"
        ));
        assert!(sql.contains("CREATE USER IF NOT EXISTS 'appuser'@'%'"));
        assert!(sql.contains("GRANT ALL PRIVILEGES ON `ficha_medica`.* TO 'appuser'@'%';"));
        assert!(sql.ends_with("FLUSH PRIVILEGES;\n"));
    }

    #[test]
    fn test_setup_sql_rotates_root_password_without_dropping_socket_auth() {
        let sql = setup_sql(&test_config());
        assert!(sql.contains("SET PASSWORD FOR 'root'@'localhost' = PASSWORD('rootpass');"));
        // ALTER USER root would drop the unix_socket plugin from the account.
        assert!(!sql.contains("ALTER USER 'root'"));
    }

    #[test]
    fn test_setup_sql_escapes_hostile_credentials() {
        let mut config = test_config();
        config.db_pass = "it's\\tricky".to_string();
        let sql = setup_sql(&config);
        assert!(sql.contains("IDENTIFIED BY 'it\\'s\\\\tricky'"));
    }

    #[test]
    fn test_escape_identifier_doubles_backticks() {
        assert_eq!(escape_identifier("odd`name"), "odd``name");
    }

    #[test]
    fn test_capture_prefers_stderr_over_stdout() {
        assert_eq!(capture(b"out", b"err\n"), "err");
        assert_eq!(capture(b"out\n", b""), "out");
    }
}
