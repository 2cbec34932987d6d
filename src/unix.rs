//! System account lookup and ownership fixup.
//!
//! The images create the `mysql` and `appuser` accounts at build time; this
//! module resolves them to numeric ids and repairs ownership of volume-mounted
//! directories, which arrive owned by whoever created them on the host.

use std::ffi::CString;
use std::fs;
use std::os::unix::fs::{chown, lchown};
use std::path::Path;

use crate::error::{BootError, Result};

/// Numeric identity of a system account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountId {
    pub uid: u32,
    pub gid: u32,
}

/// Resolve a system account by name through the passwd database.
pub fn lookup_account(name: &str) -> Result<AccountId> {
    let c_name =
        CString::new(name).map_err(|_| BootError::UnknownAccount(name.to_string()))?;
    let mut passwd: libc::passwd = unsafe { std::mem::zeroed() };
    let mut buf = vec![0_u8; 4096];
    let mut entry: *mut libc::passwd = std::ptr::null_mut();

    let rc = unsafe {
        libc::getpwnam_r(
            c_name.as_ptr(),
            &mut passwd,
            buf.as_mut_ptr().cast::<libc::c_char>(),
            buf.len(),
            &mut entry,
        )
    };
    if rc != 0 || entry.is_null() {
        return Err(BootError::UnknownAccount(name.to_string()));
    }
    Ok(AccountId {
        uid: passwd.pw_uid,
        gid: passwd.pw_gid,
    })
}

/// Create `path` if needed and hand the whole tree to `account`.
pub fn ensure_owned_dir(path: &Path, account: AccountId) -> Result<()> {
    fs::create_dir_all(path)?;
    chown_recursive(path, account)
}

/// Recursively chown `path` to `account`. Symlinked entries have their link
/// ownership changed, not their target's.
pub fn chown_recursive(path: &Path, account: AccountId) -> Result<()> {
    chown(path, Some(account.uid), Some(account.gid))?;
    if path.is_dir() {
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let child = entry.path();
            if entry.file_type()?.is_dir() {
                chown_recursive(&child, account)?;
            } else {
                lchown(&child, Some(account.uid), Some(account.gid))?;
            }
        }
    }
    Ok(())
}
