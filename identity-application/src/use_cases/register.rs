use secrecy::Secret;

use identity_core::{
    Account, AccountRepository, Email, IdentityError, PlainPassword, User, UserId, UserProfile,
    UserRepository,
};

#[derive(Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub last_name: String,
    pub password: Secret<String>,
}

#[derive(Debug)]
pub struct RegisterResponse {
    pub user_id: UserId,
}

/// Register use case - creates a user and its userpass account.
///
/// Registration is not login: no tokens are issued.
pub struct RegisterUseCase<U, A>
where
    U: UserRepository,
    A: AccountRepository,
{
    users: U,
    accounts: A,
}

impl<U, A> RegisterUseCase<U, A>
where
    U: UserRepository,
    A: AccountRepository,
{
    pub fn new(users: U, accounts: A) -> Self {
        Self { users, accounts }
    }

    #[tracing::instrument(name = "RegisterUseCase::execute", skip_all)]
    pub async fn execute(&self, request: RegisterRequest) -> Result<RegisterResponse, IdentityError> {
        let email = Email::parse(&request.email)?;

        if self.users.exists(&email).await? {
            return Err(IdentityError::domain(
                "user_already_exists",
                "User with this email already exists",
            ));
        }

        let profile = UserProfile::new(&request.name, &request.last_name)?;
        let password = PlainPassword::try_from(request.password)?;

        let hashed = tokio::task::spawn_blocking(move || password.hash())
            .await
            .map_err(|e| IdentityError::domain("password_hash_failed", e.to_string()))??;

        let user = User::new(email, profile);
        let account = Account::new_userpass(user.id(), hashed);

        self.users.save(&user).await?;
        self.accounts.save(&account).await?;

        Ok(RegisterResponse { user_id: user.id() })
    }
}

#[cfg(test)]
mod tests {
    use identity_core::Provider;

    use super::*;
    use crate::testing::{InMemoryAccounts, InMemoryUsers};

    fn use_case() -> (RegisterUseCase<InMemoryUsers, InMemoryAccounts>, InMemoryUsers, InMemoryAccounts)
    {
        let users = InMemoryUsers::default();
        let accounts = InMemoryAccounts::new(users.clone());
        (
            RegisterUseCase::new(users.clone(), accounts.clone()),
            users,
            accounts,
        )
    }

    fn request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: Secret::from("password123".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_creates_user_and_userpass_account() {
        let (use_case, users, accounts) = use_case();

        let response = use_case.execute(request("Ada@Example.com")).await.unwrap();

        let user = users.find_by_id(response.user_id).await.unwrap().unwrap();
        assert_eq!(user.email().as_str(), "ada@example.com");
        assert!(!user.is_email_verified());

        let account = accounts
            .find_by_user_and_provider(user.id(), Provider::Userpass)
            .await
            .unwrap()
            .unwrap();
        assert!(account.is_userpass());

        let password = PlainPassword::try_from(Secret::from("password123".to_string())).unwrap();
        assert!(account.password().unwrap().verify(&password));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_fails() {
        let (use_case, _, _) = use_case();

        use_case.execute(request("ada@example.com")).await.unwrap();
        let err = use_case
            .execute(request(" ADA@example.com "))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "user_already_exists");
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let (use_case, users, _) = use_case();

        assert_eq!(
            use_case.execute(request("not-an-email")).await.unwrap_err().code(),
            "invalid_email"
        );

        let mut short_password = request("ada@example.com");
        short_password.password = Secret::from("short".to_string());
        assert_eq!(
            use_case.execute(short_password).await.unwrap_err().code(),
            "password_too_short"
        );

        let mut bad_name = request("ada@example.com");
        bad_name.name = "A".to_string();
        assert_eq!(
            use_case.execute(bad_name).await.unwrap_err().code(),
            "name_too_short"
        );

        // Nothing was persisted by the failed attempts.
        assert_eq!(users.count().await, 0);
    }
}
