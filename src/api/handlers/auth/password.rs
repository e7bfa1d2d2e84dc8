//! Argon2id password hashing.
//!
//! Digests carry their own salt and parameters (PHC string format), so
//! verification never needs extra state. Plaintext is never stored or logged.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|_| anyhow!("failed to hash password"))?;
    Ok(digest.to_string())
}

/// Verify a plaintext password against a stored digest.
///
/// The underlying verifier compares in constant time; a malformed digest
/// simply fails verification.
#[must_use]
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    PasswordHash::new(digest).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let digest = hash_password("P@ss1").unwrap();
        assert!(verify_password("P@ss1", &digest));
        assert!(!verify_password("p@ss1", &digest));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("secret").unwrap();
        let second = hash_password("secret").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn digest_is_phc_format() {
        let digest = hash_password("secret").unwrap();
        assert!(digest.starts_with("$argon2"));
    }

    #[test]
    fn malformed_digest_fails_verification() {
        assert!(!verify_password("secret", "not-a-digest"));
        assert!(!verify_password("secret", ""));
    }
}
