//! Argon2id password hashing. Only PHC hash strings are ever stored.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use super::{StoreError, StoreResult};

/// Hashes `password` with a fresh random salt, returning the PHC string.
pub fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::PasswordHash(e.to_string()))
}

/// Verifies `password` against a stored PHC string.
///
/// A mismatch is `WrongPassword`; an unparseable stored hash is `PasswordHash`.
pub fn verify_password(password: &str, password_hash: &str) -> StoreResult<()> {
    let parsed =
        PasswordHash::new(password_hash).map_err(|e| StoreError::PasswordHash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| StoreError::WrongPassword)
}
