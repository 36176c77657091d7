use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use identity_core::{Email, RepositoryError, User, UserId, UserRepository};

#[derive(Default, Clone)]
pub struct MemoryUserRepository {
    users: Arc<DashMap<UserId, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        self.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().email() == email)
            .map(|entry| entry.value().clone()))
    }

    async fn exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        Ok(self.users.iter().any(|entry| entry.value().email() == email))
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        self.users
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
