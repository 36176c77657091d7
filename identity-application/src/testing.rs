//! Shared in-memory port implementations for the use-case unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use identity_core::{
    Account, AccountId, AccountRepository, Email, OAuthProvider, Provider, ProviderError,
    ProviderTokens, ProviderUser, RefreshToken, RefreshTokenRepository, RepositoryError,
    TokenGenerator, TokenGeneratorError, User, UserId, UserRepository, VerificationToken,
    VerificationTokenRepository,
};

#[derive(Default, Clone)]
pub struct InMemoryUsers {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUsers {
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        self.users.write().await.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryAccounts {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
    users: InMemoryUsers,
}

impl InMemoryAccounts {
    pub fn new(users: InMemoryUsers) -> Self {
        Self {
            accounts: Arc::default(),
            users,
        }
    }

    pub async fn count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccounts {
    async fn save(&self, account: &Account) -> Result<(), RepositoryError> {
        self.accounts
            .write()
            .await
            .insert(account.id(), account.clone());
        Ok(())
    }

    async fn find_by_user_and_provider(
        &self,
        user_id: UserId,
        provider: Provider,
    ) -> Result<Option<Account>, RepositoryError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|account| account.user_id() == user_id && account.provider() == provider)
            .cloned())
    }

    async fn find_userpass_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Account>, RepositoryError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(None);
        };
        self.find_by_user_and_provider(user.id(), Provider::Userpass)
            .await
    }

    async fn delete(&self, id: AccountId) -> Result<(), RepositoryError> {
        self.accounts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryRefreshTokens {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl InMemoryRefreshTokens {
    pub async fn count(&self) -> usize {
        self.tokens.read().await.len()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokens {
    async fn save(&self, token: &RefreshToken) -> Result<(), RepositoryError> {
        self.tokens
            .write()
            .await
            .insert(token.token().to_string(), token.clone());
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, RepositoryError> {
        Ok(self.tokens.read().await.get(token).cloned())
    }

    async fn delete(&self, token: &str) -> Result<(), RepositoryError> {
        self.tokens
            .write()
            .await
            .remove(token)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| token.user_id() != user_id);
        Ok((before - tokens.len()) as u64)
    }

    async fn cleanup_expired(&self) -> Result<u64, RepositoryError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| !token.is_expired());
        Ok((before - tokens.len()) as u64)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryVerifications {
    tokens: Arc<RwLock<HashMap<String, VerificationToken>>>,
}

impl InMemoryVerifications {
    pub async fn get(&self, token: &str) -> Option<VerificationToken> {
        self.tokens.read().await.get(token).cloned()
    }
}

#[async_trait]
impl VerificationTokenRepository for InMemoryVerifications {
    async fn save(&self, token: &VerificationToken) -> Result<(), RepositoryError> {
        self.tokens
            .write()
            .await
            .insert(token.token().to_string(), token.clone());
        Ok(())
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<VerificationToken>, RepositoryError> {
        Ok(self.tokens.read().await.get(token).cloned())
    }

    async fn mark_used(&self, token: &str, used_at: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut tokens = self.tokens.write().await;
        let stored = tokens.get(token).ok_or(RepositoryError::NotFound)?;
        if stored.is_used() {
            return Err(RepositoryError::Conflict);
        }

        let updated = VerificationToken::from_storage(
            stored.id(),
            stored.token().to_string(),
            stored.token_type(),
            stored.user_id(),
            stored.expires_at(),
            stored.created_at(),
            Some(used_at),
        )
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        tokens.insert(token.to_string(), updated);
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<(), RepositoryError> {
        self.tokens
            .write()
            .await
            .remove(token)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn cleanup_expired(&self) -> Result<u64, RepositoryError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| !token.is_expired());
        Ok((before - tokens.len()) as u64)
    }
}

#[derive(Clone)]
pub struct StubTokenGenerator;

impl TokenGenerator for StubTokenGenerator {
    fn access_token(&self, user_id: UserId, email: &Email) -> Result<String, TokenGeneratorError> {
        Ok(format!("access-{user_id}-{email}"))
    }

    fn refresh_token(&self, user_id: UserId) -> Result<String, TokenGeneratorError> {
        Ok(format!("refresh-{user_id}-{}", Uuid::new_v4()))
    }

    fn refresh_token_expiration(&self) -> Duration {
        Duration::days(30)
    }
}

/// Programmable provider double.
#[derive(Clone)]
pub struct StubProvider {
    pub provider: Provider,
    pub email: Option<String>,
    pub given_name: String,
    pub family_name: String,
    pub fail_exchange: bool,
    pub fail_user_info: bool,
}

impl StubProvider {
    pub fn google(email: &str) -> Self {
        Self {
            provider: Provider::Google,
            email: Some(email.to_string()),
            given_name: "Ada".to_string(),
            family_name: "Lovelace".to_string(),
            fail_exchange: false,
            fail_user_info: false,
        }
    }

    pub fn spotify(email: &str) -> Self {
        Self {
            provider: Provider::Spotify,
            ..Self::google(email)
        }
    }
}

#[async_trait]
impl OAuthProvider for StubProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn auth_url(&self, state: &str) -> String {
        format!("https://provider.example/authorize?state={state}")
    }

    async fn exchange_code(&self, _code: &str) -> Result<ProviderTokens, ProviderError> {
        if self.fail_exchange {
            return Err(ProviderError::Http("exchange refused".to_string()));
        }
        Ok(ProviderTokens {
            access_token: "provider-access-token".to_string(),
            refresh_token: Some("provider-refresh-token".to_string()),
            expires_at: Utc::now() + Duration::hours(1),
        })
    }

    async fn user_info(&self, _access_token: &str) -> Result<ProviderUser, ProviderError> {
        if self.fail_user_info {
            return Err(ProviderError::Http("userinfo refused".to_string()));
        }
        Ok(ProviderUser {
            email: self.email.clone(),
            given_name: self.given_name.clone(),
            family_name: self.family_name.clone(),
        })
    }
}
