use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use identity_core::{
    Account, AccountId, AccountRepository, Email, Provider, RepositoryError, UserId,
    UserRepository,
};

use super::MemoryUserRepository;

/// Holds a handle to the user repository so the userpass-by-email lookup
/// can join through the owning user, like the SQL implementation does.
#[derive(Clone)]
pub struct MemoryAccountRepository {
    accounts: Arc<DashMap<AccountId, Account>>,
    users: MemoryUserRepository,
}

impl MemoryAccountRepository {
    pub fn new(users: MemoryUserRepository) -> Self {
        Self {
            accounts: Arc::default(),
            users,
        }
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn save(&self, account: &Account) -> Result<(), RepositoryError> {
        self.accounts.insert(account.id(), account.clone());
        Ok(())
    }

    async fn find_by_user_and_provider(
        &self,
        user_id: UserId,
        provider: Provider,
    ) -> Result<Option<Account>, RepositoryError> {
        Ok(self
            .accounts
            .iter()
            .find(|entry| {
                entry.value().user_id() == user_id && entry.value().provider() == provider
            })
            .map(|entry| entry.value().clone()))
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
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
