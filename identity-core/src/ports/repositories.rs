use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::account::{Account, Provider};
use crate::domain::email::Email;
use crate::domain::ids::{AccountId, UserId};
use crate::domain::refresh_token::RefreshToken;
use crate::domain::user::User;
use crate::domain::verification_token::VerificationToken;
use crate::errors::IdentityError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("conflicting concurrent update")]
    Conflict,
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for IdentityError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => IdentityError::not_found("record", "Record not found"),
            RepositoryError::Conflict => {
                IdentityError::domain("conflict", "Conflicting concurrent update")
            }
            RepositoryError::Storage(e) => IdentityError::domain("storage_error", e),
        }
    }
}

/// Store of [`User`] records, keyed by id with a unique email index.
///
/// Implementations that also serve [`AccountRepository`] should let a
/// caller wrap a register or OAuth-callback sequence in one durable
/// transaction, so a deadline hit mid-flow never leaves a user without its
/// paired account.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Upsert by id.
    async fn save(&self, user: &User) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;
    async fn exists(&self, email: &Email) -> Result<bool, RepositoryError>;
    async fn delete(&self, id: UserId) -> Result<(), RepositoryError>;
}

/// Store of [`Account`] records. (user_id, provider) is unique.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Upsert by id.
    async fn save(&self, account: &Account) -> Result<(), RepositoryError>;
    async fn find_by_user_and_provider(
        &self,
        user_id: UserId,
        provider: Provider,
    ) -> Result<Option<Account>, RepositoryError>;
    /// Join through the owning user: the userpass account whose owner has
    /// this email.
    async fn find_userpass_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Account>, RepositoryError>;
    async fn delete(&self, id: AccountId) -> Result<(), RepositoryError>;
}

/// Store of [`RefreshToken`] records, keyed by the raw signed token string.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Upsert by token string.
    async fn save(&self, token: &RefreshToken) -> Result<(), RepositoryError>;
    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, RepositoryError>;
    async fn delete(&self, token: &str) -> Result<(), RepositoryError>;
    /// Revoke every token a user holds. Returns the number removed.
    async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError>;
    /// Bulk removal of expired rows, driven by an external sweep.
    async fn cleanup_expired(&self) -> Result<u64, RepositoryError>;
}

/// Store of [`VerificationToken`] records, keyed by token value.
#[async_trait]
pub trait VerificationTokenRepository: Send + Sync {
    async fn save(&self, token: &VerificationToken) -> Result<(), RepositoryError>;
    async fn find_by_token(&self, token: &str)
    -> Result<Option<VerificationToken>, RepositoryError>;
    /// Persist consumption of a token.
    ///
    /// MUST be an atomic conditional update (`UPDATE .. WHERE token = $1
    /// AND used_at IS NULL` or equivalent) and MUST return
    /// [`RepositoryError::Conflict`] when the token was already consumed.
    /// The in-memory entity check alone does not hold under concurrent
    /// redemption of the same token.
    async fn mark_used(&self, token: &str, used_at: DateTime<Utc>) -> Result<(), RepositoryError>;
    async fn delete(&self, token: &str) -> Result<(), RepositoryError>;
    /// Bulk removal of expired rows, driven by an external sweep.
    async fn cleanup_expired(&self) -> Result<u64, RepositoryError>;
}
