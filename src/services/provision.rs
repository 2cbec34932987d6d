//! Idempotent seeding of the application's fixed accounts.
//!
//! Accounts are keyed by email. Existing rows are reset to the declared
//! role, flags, and password; missing rows are inserted. Either way a rerun
//! converges on the same three accounts, so crash-and-restart loops and
//! image upgrades cannot drift the seed set.

use sqlx::mysql::MySqlConnectOptions;
use sqlx::{ConnectOptions, Connection, MySql, Transaction};
use tracing::info;

use crate::error::Result;
use crate::models::account::{SeedAccount, SEED_ACCOUNTS};
use crate::password;

/// What the upsert did to a single account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
}

/// Write the seed set inside one transaction.
pub async fn provision_accounts(options: MySqlConnectOptions) -> Result<()> {
    let mut conn = options.connect().await?;
    let mut tx = conn.begin().await?;
    for account in &SEED_ACCOUNTS {
        match upsert_account(&mut tx, account).await? {
            Outcome::Created => {
                info!(email = account.email, role = account.role.as_str(), "account created");
            }
            Outcome::Updated => {
                info!(email = account.email, role = account.role.as_str(), "account updated");
            }
        }
    }
    tx.commit().await?;
    conn.close().await?;
    Ok(())
}

/// Insert or reset one account, reporting which of the two happened.
///
/// Lookup and write run inside the caller's transaction, so the
/// created-or-updated decision cannot race a concurrent writer.
pub async fn upsert_account(
    tx: &mut Transaction<'_, MySql>,
    account: &SeedAccount,
) -> Result<Outcome> {
    let hash = password::hash_password(account.password);
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM accounts_user WHERE email = ?")
            .bind(account.email)
            .fetch_optional(&mut **tx)
            .await?;

    match existing {
        Some((id,)) => {
            sqlx::query(
                "UPDATE accounts_user \
                 SET password = ?, rol = ?, is_staff = ?, is_superuser = ?, \
                     is_active = 1, first_name = ?, last_name = ? \
                 WHERE id = ?",
            )
            .bind(&hash)
            .bind(account.role.as_str())
            .bind(account.is_staff)
            .bind(account.is_superuser)
            .bind(account.first_name)
            .bind(account.last_name)
            .bind(id)
            .execute(&mut **tx)
            .await?;
            Ok(Outcome::Updated)
        }
        None => {
            sqlx::query(
                "INSERT INTO accounts_user \
                 (password, last_login, is_superuser, first_name, last_name, \
                  is_staff, is_active, date_joined, email, rol, rut) \
                 VALUES (?, NULL, ?, ?, ?, ?, 1, NOW(6), ?, ?, NULL)",
            )
            .bind(&hash)
            .bind(account.is_superuser)
            .bind(account.first_name)
            .bind(account.last_name)
            .bind(account.is_staff)
            .bind(account.email)
            .bind(account.role.as_str())
            .execute(&mut **tx)
            .await?;
            Ok(Outcome::Created)
        }
    }
}
