pub mod link_account;
pub mod login;
pub mod oauth_login;
pub mod oauth_url;
pub mod register;
pub mod verify_frontend;

// Re-export for convenience
pub use link_account::{LinkAccountRequest, LinkAccountResponse, LinkAccountUseCase};
pub use login::{LoginRequest, LoginResponse, LoginUseCase};
pub use oauth_login::{OAuthCallbackRequest, OAuthCallbackResponse, OAuthLoginUseCase};
pub use oauth_url::{OAuthUrlResponse, OAuthUrlUseCase};
pub use register::{RegisterRequest, RegisterResponse, RegisterUseCase};
pub use verify_frontend::{VerifyFrontendRequest, VerifyFrontendResponse, VerifyFrontendUseCase};

use chrono::Utc;

use identity_core::{
    Email, IdentityError, OAuthProvider, ProviderUser, RefreshToken, RefreshTokenRepository,
    TokenGenerator, User,
};

/// Issue a signed access/refresh pair for `user` and persist the refresh
/// record, keyed by the raw refresh string. Shared by every login path.
pub(crate) async fn issue_session<R, G>(
    refresh_tokens: &R,
    token_generator: &G,
    user: &User,
) -> Result<(String, String), IdentityError>
where
    R: RefreshTokenRepository,
    G: TokenGenerator,
{
    let access_token = token_generator.access_token(user.id(), user.email())?;
    let refresh_token = token_generator.refresh_token(user.id())?;

    let expires_at = Utc::now() + token_generator.refresh_token_expiration();
    let record = RefreshToken::new(user.id(), refresh_token.clone(), expires_at)?;
    refresh_tokens.save(&record).await?;

    Ok((access_token, refresh_token))
}

/// Exchange the authorization code and fetch the provider profile, wrapping
/// failures stage-by-stage so callers can tell exchange, profile-fetch and
/// missing-email failures apart without seeing provider internals.
pub(crate) async fn provider_identity<P>(
    provider: &P,
    code: &str,
) -> Result<(ProviderUser, Email), IdentityError>
where
    P: OAuthProvider,
{
    let name = provider.provider();

    let grant = provider.exchange_code(code).await.map_err(|e| {
        IdentityError::authentication(
            format!("{name}_exchange_failed"),
            format!("Failed to exchange code: {e}"),
        )
    })?;

    let info = provider.user_info(&grant.access_token).await.map_err(|e| {
        IdentityError::authentication(
            format!("{name}_userinfo_failed"),
            format!("Failed to get user info: {e}"),
        )
    })?;

    let raw_email = match info.email.as_deref() {
        Some(email) if !email.is_empty() => email,
        _ => {
            return Err(IdentityError::authentication(
                format!("{name}_no_email"),
                format!("{name} account does not have an email address"),
            ));
        }
    };
    let email = Email::parse(raw_email)?;

    Ok((info, email))
}
