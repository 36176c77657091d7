use std::fmt;
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::domain::ids::{TokenId, UserId};
use crate::errors::IdentityError;

/// Variants of the single-use verification token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// The token value itself is the OAuth `state` parameter. Minted before
    /// the user is known, so it carries no user id.
    OAuthState,
    /// Bound to a user after a successful OAuth callback; redeemed by the
    /// frontend in exchange for confirmation of identity.
    FrontendVerification,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OAuthState => "oauth_state",
            Self::FrontendVerification => "frontend_verification",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oauth_state" => Ok(Self::OAuthState),
            "frontend_verification" => Ok(Self::FrontendVerification),
            _ => Err(IdentityError::domain(
                "invalid_token_type",
                "Invalid verification token type",
            )),
        }
    }
}

/// A short-lived, single-use token. Once consumed it stays consumed; the
/// repository enforces the same rule with an atomic conditional update so
/// concurrent redemptions admit exactly one winner.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationToken {
    id: TokenId,
    token: String,
    token_type: TokenType,
    user_id: Option<UserId>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
}

impl VerificationToken {
    /// Mint an OAuth state token. The generated value doubles as the
    /// `state` query parameter.
    pub fn new_oauth_state(ttl: Duration) -> Self {
        Self::mint(TokenType::OAuthState, None, ttl)
    }

    /// Mint a frontend verification token bound to `user_id`.
    pub fn new_frontend(user_id: UserId, ttl: Duration) -> Self {
        Self::mint(TokenType::FrontendVerification, Some(user_id), ttl)
    }

    fn mint(token_type: TokenType, user_id: Option<UserId>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: TokenId::new(),
            token: generate_secure_token(),
            token_type,
            user_id,
            expires_at: now + ttl,
            created_at: now,
            used_at: None,
        }
    }

    pub fn from_storage(
        id: TokenId,
        token: String,
        token_type: TokenType,
        user_id: Option<UserId>,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
        used_at: Option<DateTime<Utc>>,
    ) -> Result<Self, IdentityError> {
        if token.is_empty() {
            return Err(IdentityError::domain("empty_token", "Token cannot be empty"));
        }

        Ok(Self {
            id,
            token,
            token_type,
            user_id,
            expires_at,
            created_at,
            used_at,
        })
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn used_at(&self) -> Option<DateTime<Utc>> {
        self.used_at
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_used() && !self.token.is_empty()
    }

    /// Consume the token. Fails permanently on double use.
    /// Returns the consumption timestamp for the repository to persist.
    pub fn mark_used(&mut self) -> Result<DateTime<Utc>, IdentityError> {
        if self.is_used() {
            return Err(IdentityError::authentication(
                "token_used",
                "Verification token has already been used",
            ));
        }

        if self.is_expired() {
            return Err(IdentityError::authentication(
                "token_expired",
                "Verification token has expired",
            ));
        }

        let now = Utc::now();
        self.used_at = Some(now);
        Ok(now)
    }

    /// Check the token is a live OAuth state token.
    pub fn validate_for_oauth(&self) -> Result<(), IdentityError> {
        if self.token_type != TokenType::OAuthState {
            return Err(IdentityError::authentication(
                "invalid_token_type",
                "Token is not an OAuth state token",
            ));
        }
        self.validate_live()
    }

    /// Check the token is a live frontend verification token with a bound
    /// user.
    pub fn validate_for_frontend(&self) -> Result<(), IdentityError> {
        if self.token_type != TokenType::FrontendVerification {
            return Err(IdentityError::authentication(
                "invalid_token_type",
                "Token is not a frontend verification token",
            ));
        }
        self.validate_live()?;

        if self.user_id.is_none() {
            return Err(IdentityError::authentication(
                "missing_user_id",
                "Frontend verification token must have a user ID",
            ));
        }

        Ok(())
    }

    fn validate_live(&self) -> Result<(), IdentityError> {
        if self.is_valid() {
            return Ok(());
        }

        if self.is_expired() {
            return Err(IdentityError::authentication(
                "token_expired",
                "Verification token has expired",
            ));
        }
        if self.is_used() {
            return Err(IdentityError::authentication(
                "token_used",
                "Verification token has already been used",
            ));
        }
        Err(IdentityError::authentication(
            "invalid_token",
            "Invalid verification token",
        ))
    }
}

/// 256 bits of OS entropy, URL-safe encoded so the value can ride in an
/// OAuth `state` or redirect query parameter unescaped.
fn generate_secure_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expired_state() -> VerificationToken {
        VerificationToken::new_oauth_state(Duration::seconds(-10))
    }

    #[test]
    fn test_minted_tokens_are_distinct_and_url_safe() {
        let a = VerificationToken::new_oauth_state(Duration::minutes(5));
        let b = VerificationToken::new_oauth_state(Duration::minutes(5));

        assert_ne!(a.token(), b.token());
        assert_eq!(a.token().len(), 43); // 32 bytes, base64 no-pad
        assert!(
            a.token()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert!(a.user_id().is_none());
    }

    #[test]
    fn test_oauth_state_single_use() {
        let mut token = VerificationToken::new_oauth_state(Duration::minutes(5));

        assert!(token.validate_for_oauth().is_ok());
        token.mark_used().unwrap();

        assert_eq!(token.validate_for_oauth().unwrap_err().code(), "token_used");
        assert_eq!(token.mark_used().unwrap_err().code(), "token_used");
    }

    #[test]
    fn test_expired_state_fails_even_if_unused() {
        let token = expired_state();
        assert_eq!(token.validate_for_oauth().unwrap_err().code(), "token_expired");
    }

    #[test]
    fn test_mark_used_rejects_expired() {
        let mut token = expired_state();
        assert_eq!(token.mark_used().unwrap_err().code(), "token_expired");
    }

    #[test]
    fn test_validate_rejects_wrong_type() {
        let state = VerificationToken::new_oauth_state(Duration::minutes(5));
        assert_eq!(
            state.validate_for_frontend().unwrap_err().code(),
            "invalid_token_type"
        );

        let frontend = VerificationToken::new_frontend(UserId::new(), Duration::minutes(10));
        assert_eq!(
            frontend.validate_for_oauth().unwrap_err().code(),
            "invalid_token_type"
        );
    }

    #[test]
    fn test_frontend_token_requires_bound_user() {
        let user_id = UserId::new();
        let token = VerificationToken::new_frontend(user_id, Duration::minutes(10));
        assert!(token.validate_for_frontend().is_ok());
        assert_eq!(token.user_id(), Some(user_id));

        // An unbound frontend token can only come from storage corruption.
        let unbound = VerificationToken::from_storage(
            TokenId::new(),
            token.token().to_string(),
            TokenType::FrontendVerification,
            None,
            token.expires_at(),
            token.created_at(),
            None,
        )
        .unwrap();
        assert_eq!(
            unbound.validate_for_frontend().unwrap_err().code(),
            "missing_user_id"
        );
    }

    #[test]
    fn test_from_storage_rejects_empty_token() {
        let err = VerificationToken::from_storage(
            TokenId::new(),
            String::new(),
            TokenType::OAuthState,
            None,
            Utc::now(),
            Utc::now(),
            None,
        )
        .unwrap_err();
        assert_eq!(err.code(), "empty_token");
    }

    #[test]
    fn test_token_type_round_trip() {
        for token_type in [TokenType::OAuthState, TokenType::FrontendVerification] {
            assert_eq!(token_type.as_str().parse::<TokenType>().unwrap(), token_type);
        }
        assert!("email_confirm".parse::<TokenType>().is_err());
    }
}
