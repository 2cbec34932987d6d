//! Application server handoff and liveness probing.

use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use tracing::info;

use crate::config::{APP_ACCOUNT, APP_DIR, HTTP_PORT};
use crate::error::{BootError, Result};
use crate::unix;

/// Writable directories the application expects under its checkout.
const WRITABLE_DIRS: [&str; 2] = ["media", "staticfiles"];

/// Make sure upload and static asset directories exist and belong to the
/// unprivileged account the server runs as.
pub fn prepare_app_dirs() -> Result<()> {
    let app = unix::lookup_account(APP_ACCOUNT)?;
    for dir in WRITABLE_DIRS {
        unix::ensure_owned_dir(&Path::new(APP_DIR).join(dir), app)?;
    }
    Ok(())
}

/// Replace this process with the application server, dropping privileges to
/// the unprivileged account. Does not return on success: the server inherits
/// pid and file descriptors, so container signals reach it directly.
pub fn exec_app_server() -> Result<()> {
    let account = unix::lookup_account(APP_ACCOUNT)?;
    info!(
        port = HTTP_PORT,
        account = APP_ACCOUNT,
        "handing off to application server"
    );
    let err = Command::new("python3")
        .args(["manage.py", "runserver"])
        .arg(format!("0.0.0.0:{HTTP_PORT}"))
        .current_dir(APP_DIR)
        .uid(account.uid)
        .gid(account.gid)
        .exec();
    Err(BootError::CommandSpawn {
        program: "python3 manage.py runserver".to_string(),
        source: err,
    })
}

/// One-shot liveness probe against the application port.
///
/// Any HTTP response counts as alive: depending on configuration the landing
/// page may redirect to the login view or reject the Host header, and both
/// still prove the server is up and answering.
pub async fn probe_http(port: u16) -> Result<()> {
    let url = format!("http://127.0.0.1:{port}/");
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    let response = client.get(&url).send().await?;
    info!(status = %response.status(), %url, "application responded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_fails_when_nothing_listens() {
        // Bind and drop to find a port nothing answers on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = probe_http(port).await.unwrap_err();
        assert!(matches!(err, BootError::Probe(_)));
    }
}
