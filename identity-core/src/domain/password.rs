use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{PasswordHasher, SaltString, rand_core},
};
use secrecy::{ExposeSecret, Secret};

use crate::errors::IdentityError;

fn argon2() -> Result<Argon2<'static>, IdentityError> {
    Ok(Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(15000, 2, 1, None)
            .map_err(|e| IdentityError::domain("password_hash_failed", e.to_string()))?,
    ))
}

/// A raw password that passed the length policy (8-128 chars).
#[derive(Debug, Clone)]
pub struct PlainPassword(Secret<String>);

impl TryFrom<Secret<String>> for PlainPassword {
    type Error = IdentityError;

    fn try_from(password: Secret<String>) -> Result<Self, Self::Error> {
        let len = password.expose_secret().chars().count();

        if len == 0 {
            return Err(IdentityError::domain(
                "empty_password",
                "Password cannot be empty",
            ));
        }

        if len < 8 {
            return Err(IdentityError::domain(
                "password_too_short",
                "Password must be at least 8 characters",
            ));
        }

        if len > 128 {
            return Err(IdentityError::domain(
                "password_too_long",
                "Password cannot exceed 128 characters",
            ));
        }

        Ok(Self(password))
    }
}

impl PlainPassword {
    /// Hash with argon2id. CPU-bound; async callers offload this to a
    /// blocking thread.
    pub fn hash(&self) -> Result<HashedPassword, IdentityError> {
        let salt = SaltString::generate(rand_core::OsRng);
        let hash = argon2()?
            .hash_password(self.0.expose_secret().as_bytes(), &salt)
            .map_err(|_| IdentityError::domain("password_hash_failed", "Failed to hash password"))?;

        Ok(HashedPassword(Secret::from(hash.to_string())))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// An argon2id PHC hash string, as persisted on userpass accounts.
#[derive(Debug, Clone)]
pub struct HashedPassword(Secret<String>);

impl HashedPassword {
    /// Wrap a hash loaded from storage. Empty hashes are invalid.
    pub fn from_phc(hash: Secret<String>) -> Result<Self, IdentityError> {
        if hash.expose_secret().is_empty() {
            return Err(IdentityError::domain(
                "empty_password_hash",
                "Password hash cannot be empty",
            ));
        }
        Ok(Self(hash))
    }

    /// True iff `candidate` is the password this hash was derived from.
    pub fn verify(&self, candidate: &PlainPassword) -> bool {
        let Ok(parsed) = PasswordHash::new(self.0.expose_secret()) else {
            return false;
        };
        let Ok(hasher) = argon2() else {
            return false;
        };
        hasher
            .verify_password(candidate.expose().as_bytes(), &parsed)
            .is_ok()
    }

    pub fn as_secret(&self) -> &Secret<String> {
        &self.0
    }
}
