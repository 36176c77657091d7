use chrono::{DateTime, Duration, Utc};

use crate::domain::ids::{TokenId, UserId};
use crate::errors::IdentityError;

/// Durable record of an issued refresh credential. The signed token string
/// is stored alongside the row so the credential can be looked up and
/// revoked by value.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshToken {
    id: TokenId,
    user_id: UserId,
    token: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn new(
        user_id: UserId,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, IdentityError> {
        if token.is_empty() {
            return Err(IdentityError::domain("empty_token", "Token cannot be empty"));
        }

        if expires_at < Utc::now() {
            return Err(IdentityError::domain(
                "expired_token",
                "Token expiration time cannot be in the past",
            ));
        }

        Ok(Self {
            id: TokenId::new(),
            user_id,
            token,
            expires_at,
            created_at: Utc::now(),
        })
    }

    pub fn from_storage(
        id: TokenId,
        user_id: UserId,
        token: String,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, IdentityError> {
        if token.is_empty() {
            return Err(IdentityError::domain("empty_token", "Token cannot be empty"));
        }

        Ok(Self {
            id,
            user_id,
            token,
            expires_at,
            created_at,
        })
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.token.is_empty()
    }

    pub fn time_until_expiration(&self) -> Duration {
        if self.is_expired() {
            return Duration::zero();
        }
        self.expires_at - Utc::now()
    }
}
