use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::account::Provider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Http(String),
    #[error("malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Tokens returned by the provider's code exchange.
#[derive(Debug, Clone)]
pub struct ProviderTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Profile fields fetched from the provider. `email` is optional because
/// some providers allow accounts without one; the name parts may be empty
/// when the provider only exposes a display name it could not split.
#[derive(Debug, Clone)]
pub struct ProviderUser {
    pub email: Option<String>,
    pub given_name: String,
    pub family_name: String,
}

/// Capability interface of an external identity provider. One
/// implementation per provider; use cases only ever see this trait.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Which provider this is - used for account records and error codes.
    fn provider(&self) -> Provider;

    /// The authorization URL the user agent is redirected to, with `state`
    /// bound into it.
    fn auth_url(&self, state: &str) -> String;

    /// Exchange an authorization code for provider tokens.
    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, ProviderError>;

    /// Fetch the provider-side profile for an access token.
    async fn user_info(&self, access_token: &str) -> Result<ProviderUser, ProviderError>;
}
