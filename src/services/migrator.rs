//! Schema migration and static asset collection via the application's own
//! management tool.
//!
//! The schema is owned by the web application, not by this binary: it ships
//! the migration history, so the sequencer shells out to `manage.py` instead
//! of carrying DDL of its own.

use std::path::PathBuf;
use std::process::Output;

use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{BootError, Result};

/// Runner for `manage.py` subcommands.
pub struct Migrator {
    python: String,
    app_dir: PathBuf,
}

impl Migrator {
    pub fn new(python: impl Into<String>, app_dir: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            app_dir: app_dir.into(),
        }
    }

    /// Apply pending schema migrations. Any failure here is fatal: starting
    /// the application against a half-migrated schema corrupts data.
    pub async fn migrate(&self) -> Result<()> {
        info!("applying schema migrations");
        let output = self.manage(&["migrate", "--noinput"]).await?;
        if !output.status.success() {
            return Err(BootError::CommandFailed {
                program: "manage.py migrate".to_string(),
                status: output.status,
                output: diagnostics(&output),
            });
        }
        info!("schema migrations complete");
        Ok(())
    }

    /// Collect static assets. The one tolerated failure in the sequence:
    /// the application degrades to unstyled pages but still serves.
    pub async fn collect_static(&self) {
        match self.manage(&["collectstatic", "--noinput"]).await {
            Ok(output) if output.status.success() => {
                info!("static assets collected");
            }
            Ok(output) => {
                warn!(
                    status = %output.status,
                    detail = %diagnostics(&output),
                    "static asset collection failed, continuing without it"
                );
            }
            Err(e) => {
                warn!(error = %e, "static asset collection failed, continuing without it");
            }
        }
    }

    async fn manage(&self, args: &[&str]) -> Result<Output> {
        Command::new(&self.python)
            .arg("manage.py")
            .args(args)
            .current_dir(&self.app_dir)
            .output()
            .await
            .map_err(|e| BootError::CommandSpawn {
                program: format!("{} manage.py {}", self.python, args.join(" ")),
                source: e,
            })
    }
}

fn diagnostics(output: &Output) -> String {
    let err = String::from_utf8_lossy(&output.stderr);
    let err = err.trim();
    if err.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        err.to_string()
    }
}
