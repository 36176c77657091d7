use chrono::Duration;

use identity_core::{
    Account, AccountRepository, IdentityError, OAuthProvider, RefreshTokenRepository,
    RepositoryError, TokenGenerator, User, UserId, UserProfile, UserRepository, VerificationToken,
    VerificationTokenRepository,
};

use super::{issue_session, provider_identity};

#[derive(Debug)]
pub struct OAuthCallbackRequest {
    pub code: String,
    pub state: String,
}

#[derive(Debug)]
pub struct OAuthCallbackResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: UserId,
    pub is_new_user: bool,
    /// One-time token the callback redirect hands to the frontend instead
    /// of raw bearer tokens.
    pub frontend_verification_token: String,
}

/// OAuth callback login use case.
///
/// Consumes the state token, trades the authorization code for a provider
/// identity, finds or creates the user and its provider account, issues a
/// session, and mints the frontend verification token.
///
/// A first OAuth login whose email matches an existing user attaches a new
/// provider account to that user (auto-link). Both supported providers only
/// return owner-verified emails; the explicit linking flow remains available
/// for callers that want an authenticated link instead.
pub struct OAuthLoginUseCase<U, A, R, V, G, P>
where
    U: UserRepository,
    A: AccountRepository,
    R: RefreshTokenRepository,
    V: VerificationTokenRepository,
    G: TokenGenerator,
    P: OAuthProvider,
{
    users: U,
    accounts: A,
    refresh_tokens: R,
    verifications: V,
    token_generator: G,
    provider: P,
    frontend_ttl: Duration,
}

impl<U, A, R, V, G, P> OAuthLoginUseCase<U, A, R, V, G, P>
where
    U: UserRepository,
    A: AccountRepository,
    R: RefreshTokenRepository,
    V: VerificationTokenRepository,
    G: TokenGenerator,
    P: OAuthProvider,
{
    pub fn new(
        users: U,
        accounts: A,
        refresh_tokens: R,
        verifications: V,
        token_generator: G,
        provider: P,
        frontend_ttl: Duration,
    ) -> Self {
        Self {
            users,
            accounts,
            refresh_tokens,
            verifications,
            token_generator,
            provider,
            frontend_ttl,
        }
    }

    #[tracing::instrument(name = "OAuthLoginUseCase::execute", skip_all, fields(provider = %self.provider.provider()))]
    pub async fn execute(
        &self,
        request: OAuthCallbackRequest,
    ) -> Result<OAuthCallbackResponse, IdentityError> {
        self.consume_state(&request.state).await?;

        let (info, email) = provider_identity(&self.provider, &request.code).await?;
        let provider = self.provider.provider();

        let (mut user, is_new_user) = match self.users.find_by_email(&email).await? {
            Some(user) => (user, false),
            None => {
                let profile = UserProfile::new(&info.given_name, &info.family_name)?;
                let user = User::new(email, profile);
                (user, true)
            }
        };

        if is_new_user {
            // Providers hand out owner-verified emails only.
            user.verify_email();
            self.users.save(&user).await?;
        }

        if self
            .accounts
            .find_by_user_and_provider(user.id(), provider)
            .await?
            .is_none()
        {
            let account = Account::new_oauth(user.id(), provider)?;
            self.accounts.save(&account).await?;
        }

        user.can_authenticate()?;

        let (access_token, refresh_token) =
            issue_session(&self.refresh_tokens, &self.token_generator, &user).await?;

        let frontend_token = VerificationToken::new_frontend(user.id(), self.frontend_ttl);
        self.verifications.save(&frontend_token).await?;

        Ok(OAuthCallbackResponse {
            access_token,
            refresh_token,
            user_id: user.id(),
            is_new_user,
            frontend_verification_token: frontend_token.token().to_string(),
        })
    }

    /// Look up and irreversibly consume the state token. The repository
    /// settles concurrent redemptions: whoever loses the conditional update
    /// fails here, before any provider call happens.
    async fn consume_state(&self, state: &str) -> Result<(), IdentityError> {
        let mut token = self.verifications.find_by_token(state).await?.ok_or_else(|| {
            IdentityError::authentication(
                "invalid_state",
                "OAuth state parameter not found or invalid",
            )
        })?;

        token.validate_for_oauth()?;
        let used_at = token.mark_used()?;

        self.verifications
            .mark_used(token.token(), used_at)
            .await
            .map_err(|error| match error {
                RepositoryError::Conflict | RepositoryError::NotFound => {
                    IdentityError::authentication(
                        "token_used",
                        "Verification token has already been used",
                    )
                }
                other => other.into(),
            })
    }
}
