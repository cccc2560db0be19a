use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use thiserror::Error;
use tracing::warn;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Credential failures that are not a wrong password. Callers surface them as 500s.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("could not hash the account password: {0}")]
    Hashing(password_hash::Error),
    #[error("stored account password hash is unusable: {0}")]
    StoredHash(password_hash::Error),
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Salted argon2id PHC string for a new or changed account password.
pub fn hash_password(plain: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(CredentialError::Hashing)
}

/// `Ok(false)` only for a mismatch. A stored value that is not a PHC string
/// (plaintext left from an old import, say) is an error, not a failed login.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        warn!(error = %e, "account has a password hash that does not parse");
        CredentialError::StoredHash(e)
    })?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredentialError::StoredHash(e)),
    }
}
