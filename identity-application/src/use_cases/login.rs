use secrecy::Secret;

use identity_core::{
    AccountRepository, Email, IdentityError, PlainPassword, RefreshTokenRepository, TokenGenerator,
    UserId, UserRepository,
};

use super::issue_session;

#[derive(Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: Secret<String>,
}

#[derive(Debug)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: UserId,
}

fn invalid_credentials() -> IdentityError {
    IdentityError::authentication("invalid_credentials", "Invalid email or password")
}

/// Password login use case.
///
/// "No such account" and "wrong password" produce the identical error so a
/// caller cannot enumerate registered emails.
pub struct LoginUseCase<U, A, R, G>
where
    U: UserRepository,
    A: AccountRepository,
    R: RefreshTokenRepository,
    G: TokenGenerator,
{
    users: U,
    accounts: A,
    refresh_tokens: R,
    token_generator: G,
}

impl<U, A, R, G> LoginUseCase<U, A, R, G>
where
    U: UserRepository,
    A: AccountRepository,
    R: RefreshTokenRepository,
    G: TokenGenerator,
{
    pub fn new(users: U, accounts: A, refresh_tokens: R, token_generator: G) -> Self {
        Self {
            users,
            accounts,
            refresh_tokens,
            token_generator,
        }
    }

    #[tracing::instrument(name = "LoginUseCase::execute", skip_all)]
    pub async fn execute(&self, request: LoginRequest) -> Result<LoginResponse, IdentityError> {
        let email = Email::parse(&request.email)?;
        let password = PlainPassword::try_from(request.password)?;

        let account = self
            .accounts
            .find_userpass_by_email(&email)
            .await?
            .ok_or_else(invalid_credentials)?;

        let hashed = account.password().cloned().ok_or_else(invalid_credentials)?;
        let matches = tokio::task::spawn_blocking(move || hashed.verify(&password))
            .await
            .map_err(|e| IdentityError::domain("password_hash_failed", e.to_string()))?;
        if !matches {
            return Err(invalid_credentials());
        }

        let user = self
            .users
            .find_by_id(account.user_id())
            .await?
            .ok_or_else(|| IdentityError::authentication("user_not_found", "User not found"))?;

        user.can_authenticate()?;

        let (access_token, refresh_token) =
            issue_session(&self.refresh_tokens, &self.token_generator, &user).await?;

        Ok(LoginResponse {
            access_token,
            refresh_token,
            user_id: user.id(),
        })
    }
}
