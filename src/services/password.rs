//! Password hashing
//!
//! Argon2id with the argon2 crate's default parameters and a random salt per
//! hash. Hashes use the PHC string format, which is what
//! `auth.admin_password_hash` expects.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

/// Hash of a throwaway secret, checked when no usable admin hash is configured
/// so a rejected login costs the same as a real comparison.
static PLACEHOLDER_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("vitrine-placeholder-secret").ok());

/// Hash a password using Argon2id.
///
/// ```ignore
/// use vitrine::services::password::hash_password;
///
/// let hash = hash_password("correct horse battery staple")?;
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
        .context("Password hashing failed")?;

    Ok(password_hash.to_string())
}

/// Verify a password against a PHC hash.
///
/// Returns `Ok(false)` on mismatch and an error when the hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))
        .context("Failed to parse password hash")?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification failed: {}", e))
            .context("Password verification error"),
    }
}

/// Run a verification whose result is discarded. Always `false`.
pub fn burn_verification(password: &str) -> bool {
    if let Some(hash) = PLACEHOLDER_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}

/// Whether `hash` parses as a PHC string
pub fn is_valid_hash(hash: &str) -> bool {
    PasswordHash::new(hash).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_produces_argon2id_hash() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(is_valid_hash(&hash));
    }

    #[test]
    fn test_hash_password_salts_each_hash() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct_password").unwrap();

        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("password", "invalid_hash_format").is_err());
        assert!(!is_valid_hash("invalid_hash_format"));
        assert!(!is_valid_hash(""));
    }

    #[test]
    fn test_burn_verification_never_succeeds() {
        assert!(!burn_verification("vitrine-placeholder-secret"));
        assert!(!burn_verification(""));
    }

    #[test]
    fn test_hash_password_unicode() {
        let password = "mot de passe été 🔐";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
    }
}
