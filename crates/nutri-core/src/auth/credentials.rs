//! Password hashing.
//!
//! Passwords are stored as Argon2id PHC strings and only ever compared through
//! [`verify_password`].

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use super::{AuthError, AuthResult};
use crate::config::AuthSettings;

/// Argon2id hasher with configured cost parameters.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
    min_password_length: usize,
}

impl CredentialHasher {
    /// Build a hasher from auth settings.
    pub fn new(settings: &AuthSettings) -> AuthResult<Self> {
        let params = Params::new(
            settings.hash_memory_kib,
            settings.hash_iterations,
            settings.hash_parallelism,
            None,
        )
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

        Ok(Self {
            params,
            min_password_length: settings.min_password_length,
        })
    }

    /// Hash a new password, enforcing the minimum length.
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        if password.chars().count() < self.min_password_length {
            return Err(AuthError::WeakPassword {
                min: self.min_password_length,
            });
        }

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        Ok(hash.to_string())
    }
}

/// Verify a password against a stored PHC string.
///
/// Cost parameters are read from the hash itself, so hashes made with other
/// settings still verify. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
