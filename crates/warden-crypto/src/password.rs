//! Salted adaptive password hashing for the credential registry.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

use crate::error::CryptoError;

/// Hash `password` with a fresh random salt, returning a self-describing PHC string.
///
/// # Errors
///
/// Returns an error if the underlying hasher fails (out of memory, bad params).
pub fn hash_password(password: &str) -> Result<String, CryptoError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CryptoError::PasswordHashFailed(e.to_string()))
}

/// Verify `password` against a previously produced PHC hash string.
///
/// Runs in constant time with respect to the candidate password via argon2's
/// own verification routine; returns `Ok(())` only on an exact match.
///
/// # Errors
///
/// Returns [`CryptoError::PasswordMismatch`] on a wrong password, or
/// [`CryptoError::PasswordHashFailed`] if `stored_hash` is not a valid PHC string.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), CryptoError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| CryptoError::PasswordHashFailed(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| CryptoError::PasswordMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).is_ok());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hash = hash_password("hunter2").unwrap();
        let err = verify_password("wrong", &hash).unwrap_err();
        assert!(matches!(err, CryptoError::PasswordMismatch));
    }

    #[test]
    fn same_password_hashes_differ_by_salt() {
        let a = hash_password("hunter2").unwrap();
        let b = hash_password("hunter2").unwrap();
        assert_ne!(a, b);
    }
}
