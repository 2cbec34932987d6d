//! Password hashing in the application's stored format.
//!
//! The web application checks credentials against hashes of the form
//! `pbkdf2_sha256$<iterations>$<salt>$<base64 digest>`, so seeded accounts
//! must be written in exactly that encoding or nobody can log in.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::error::{BootError, Result};

const ALGORITHM: &str = "pbkdf2_sha256";
const DIGEST_LEN: usize = 32;
const SALT_LEN: usize = 22;

/// Iteration count written into new hashes. Verification always honors the
/// count embedded in the stored hash instead.
const ITERATIONS: u32 = 600_000;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    encode(password, &generate_salt(), ITERATIONS)
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool> {
    let mut parts = encoded.split('$');
    let (algorithm, iterations, salt, digest) =
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(i), Some(s), Some(d)) => (a, i, s, d),
            _ => {
                return Err(BootError::PasswordHash(
                    "malformed encoded hash".to_string(),
                ))
            }
        };
    if algorithm != ALGORITHM {
        return Err(BootError::PasswordHash(format!(
            "unsupported hasher: {algorithm}"
        )));
    }
    let iterations: u32 = iterations
        .parse()
        .map_err(|_| BootError::PasswordHash(format!("bad iteration count: {iterations}")))?;
    Ok(derive(password, salt, iterations) == digest)
}

fn generate_salt() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::rng();
    (0..SALT_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

fn derive(password: &str, salt: &str, iterations: u32) -> String {
    let mut digest = [0_u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        iterations,
        &mut digest,
    );
    BASE64.encode(digest)
}

fn encode(password: &str, salt: &str, iterations: u32) -> String {
    format!(
        "{ALGORITHM}${iterations}${salt}${digest}",
        digest = derive(password, salt, iterations)
    )
}
