use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use identity_core::{RefreshToken, RefreshTokenRepository, RepositoryError, UserId};

#[derive(Default, Clone)]
pub struct MemoryRefreshTokenRepository {
    tokens: Arc<DashMap<String, RefreshToken>>,
}

impl MemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryRefreshTokenRepository {
    async fn save(&self, token: &RefreshToken) -> Result<(), RepositoryError> {
        self.tokens.insert(token.token().to_string(), token.clone());
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, RepositoryError> {
        Ok(self.tokens.get(token).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, token: &str) -> Result<(), RepositoryError> {
        self.tokens
            .remove(token)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let before = self.tokens.len();
        self.tokens.retain(|_, token| token.user_id() != user_id);
        Ok((before - self.tokens.len()) as u64)
    }

    async fn cleanup_expired(&self) -> Result<u64, RepositoryError> {
        let before = self.tokens.len();
        self.tokens.retain(|_, token| !token.is_expired());
        Ok((before - self.tokens.len()) as u64)
    }
}
