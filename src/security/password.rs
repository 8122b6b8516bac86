//! Artist password hashing
//!
//! The configuration stores an Argon2id PHC string (algorithm, parameters,
//! salt and hash in one line). Login re-derives the hash from the supplied
//! password with the stored parameters.

use crate::error::{Error, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;

/// Salt length in bytes
const SALT_BYTES: usize = 16;

/// Hash a password into a PHC string with a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| Error::Crypto(format!("Invalid salt: {}", e)))?;

    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Crypto(format!("Failed to hash password: {}", e)))?;
    Ok(phc.to_string())
}

/// Whether `phc` parses as a password hash
pub fn is_valid_hash(phc: &str) -> bool {
    PasswordHash::new(phc.trim()).is_ok()
}

/// Check a supplied password against a configured PHC string.
///
/// An empty or unparseable hash never matches, which disables login.
pub fn verify_password(supplied: &str, phc: &str) -> bool {
    if supplied.is_empty() {
        return false;
    }
    match PasswordHash::new(phc.trim()) {
        Ok(parsed) => Argon2::default()
            .verify_password(supplied.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
