use chrono::Duration;

use identity_core::{IdentityError, OAuthProvider, VerificationToken, VerificationTokenRepository};

#[derive(Debug)]
pub struct OAuthUrlResponse {
    pub url: String,
    pub state: String,
}

/// Mints an authorization URL for one provider.
///
/// The `state` parameter is a server-minted single-use token persisted
/// before the redirect, so the callback can only be bound to an
/// authorization request this server actually issued - a client-supplied
/// state is never trusted.
pub struct OAuthUrlUseCase<P, V>
where
    P: OAuthProvider,
    V: VerificationTokenRepository,
{
    provider: P,
    verifications: V,
    state_ttl: Duration,
}

impl<P, V> OAuthUrlUseCase<P, V>
where
    P: OAuthProvider,
    V: VerificationTokenRepository,
{
    pub fn new(provider: P, verifications: V, state_ttl: Duration) -> Self {
        Self {
            provider,
            verifications,
            state_ttl,
        }
    }

    #[tracing::instrument(name = "OAuthUrlUseCase::execute", skip_all, fields(provider = %self.provider.provider()))]
    pub async fn execute(&self) -> Result<OAuthUrlResponse, IdentityError> {
        let token = VerificationToken::new_oauth_state(self.state_ttl);
        self.verifications.save(&token).await?;

        let url = self.provider.auth_url(token.token());

        Ok(OAuthUrlResponse {
            url,
            state: token.token().to_string(),
        })
    }
}
