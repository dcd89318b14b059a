use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use sha2::Sha256;
use tracing::error;

type HmacSha256 = Hmac<Sha256>;

const PHC_PREFIX: &str = "$argon2";
const COMPARE_KEY: &[u8] = b"adplanner-secret-compare";

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })
}

/// Checks `plain` against a stored credential.
///
/// Records written by the old service hold the password itself rather than a
/// PHC hash; those are compared in constant time and flagged by
/// [`needs_rehash`] so the caller can upgrade them.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    if needs_rehash(stored) {
        return Ok(constant_time_eq(plain, stored));
    }
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

pub fn needs_rehash(stored: &str) -> bool {
    !stored.starts_with(PHC_PREFIX)
}

/// Length-independent constant-time string equality via HMAC tag verification.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let tag = |msg: &str| {
        HmacSha256::new_from_slice(COMPARE_KEY).map(|mut mac| {
            mac.update(msg.as_bytes());
            mac
        })
    };
    match (tag(a), tag(b)) {
        (Ok(expected), Ok(actual)) => actual
            .verify_slice(&expected.finalize().into_bytes())
            .is_ok(),
        _ => false,
    }
}
