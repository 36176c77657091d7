use identity_core::{
    Account, AccountRepository, IdentityError, OAuthProvider, UserId, UserRepository,
};

use super::provider_identity;

#[derive(Debug)]
pub struct LinkAccountRequest {
    /// Id of the already-authenticated user, taken from their access token.
    pub user_id: String,
    pub code: String,
    /// Carried for wire parity with the login callback; the access token is
    /// the binding that matters here, so it is not re-validated.
    pub state: String,
}

#[derive(Debug)]
pub struct LinkAccountResponse {
    pub success: bool,
    pub message: String,
}

/// Attach an additional provider account to an existing user, without
/// creating a duplicate user.
pub struct LinkAccountUseCase<U, A, P>
where
    U: UserRepository,
    A: AccountRepository,
    P: OAuthProvider,
{
    users: U,
    accounts: A,
    provider: P,
}

impl<U, A, P> LinkAccountUseCase<U, A, P>
where
    U: UserRepository,
    A: AccountRepository,
    P: OAuthProvider,
{
    pub fn new(users: U, accounts: A, provider: P) -> Self {
        Self {
            users,
            accounts,
            provider,
        }
    }

    #[tracing::instrument(name = "LinkAccountUseCase::execute", skip_all, fields(provider = %self.provider.provider()))]
    pub async fn execute(
        &self,
        request: LinkAccountRequest,
    ) -> Result<LinkAccountResponse, IdentityError> {
        let user_id = UserId::parse(&request.user_id)
            .map_err(|_| IdentityError::domain("invalid_user_id", "Invalid user ID"))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| IdentityError::domain("user_not_found", "User not found"))?;

        // The provider identity is fetched to prove the code is real and
        // usable, even though linking keys off the authenticated user.
        let (_info, _email) = provider_identity(&self.provider, &request.code).await?;

        let provider = self.provider.provider();
        if self
            .accounts
            .find_by_user_and_provider(user.id(), provider)
            .await?
            .is_some()
        {
            return Err(IdentityError::domain(
                "account_already_linked",
                format!("{provider} account is already linked to this user"),
            ));
        }

        let account = Account::new_oauth(user.id(), provider)?;
        self.accounts.save(&account).await?;

        Ok(LinkAccountResponse {
            success: true,
            message: format!("{provider} account linked successfully"),
        })
    }
}
