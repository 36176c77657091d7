use chrono::Duration;
use thiserror::Error;

use crate::domain::email::Email;
use crate::domain::ids::UserId;
use crate::errors::IdentityError;

#[derive(Debug, Error)]
pub enum TokenGeneratorError {
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("invalid or expired token: {0}")]
    Invalid(String),
}

impl From<TokenGeneratorError> for IdentityError {
    fn from(error: TokenGeneratorError) -> Self {
        match error {
            TokenGeneratorError::Signing(e) => IdentityError::domain("token_generation_failed", e),
            TokenGeneratorError::Invalid(_) => {
                IdentityError::authentication("invalid_token", "Invalid or expired token")
            }
        }
    }
}

/// Issues signed session credentials. Signing is pure CPU work, so the
/// trait is synchronous.
pub trait TokenGenerator: Send + Sync {
    fn access_token(&self, user_id: UserId, email: &Email) -> Result<String, TokenGeneratorError>;
    fn refresh_token(&self, user_id: UserId) -> Result<String, TokenGeneratorError>;
    /// How long issued refresh tokens live; the persisted record's
    /// `expires_at` is `now + refresh_token_expiration()`.
    fn refresh_token_expiration(&self) -> Duration;
}
