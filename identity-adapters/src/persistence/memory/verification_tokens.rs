use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use identity_core::{
    RepositoryError, VerificationToken, VerificationTokenRepository,
};

#[derive(Default, Clone)]
pub struct MemoryVerificationTokenRepository {
    tokens: Arc<DashMap<String, VerificationToken>>,
}

impl MemoryVerificationTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationTokenRepository for MemoryVerificationTokenRepository {
    async fn save(&self, token: &VerificationToken) -> Result<(), RepositoryError> {
        self.tokens.insert(token.token().to_string(), token.clone());
        Ok(())
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<VerificationToken>, RepositoryError> {
        Ok(self.tokens.get(token).map(|entry| entry.value().clone()))
    }

    async fn mark_used(&self, token: &str, used_at: DateTime<Utc>) -> Result<(), RepositoryError> {
        // The entry guard holds the shard write lock, so the used check and
        // the overwrite are one atomic step - concurrent redemptions of the
        // same token admit exactly one winner.
        let Some(mut entry) = self.tokens.get_mut(token) else {
            return Err(RepositoryError::NotFound);
        };
        if entry.is_used() {
            return Err(RepositoryError::Conflict);
        }

        let consumed = VerificationToken::from_storage(
            entry.id(),
            entry.token().to_string(),
            entry.token_type(),
            entry.user_id(),
            entry.expires_at(),
            entry.created_at(),
            Some(used_at),
        )
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        *entry = consumed;
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<(), RepositoryError> {
        self.tokens
            .remove(token)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn cleanup_expired(&self) -> Result<u64, RepositoryError> {
        let before = self.tokens.len();
        self.tokens.retain(|_, token| !token.is_expired());
        Ok((before - self.tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[tokio::test]
    async fn test_mark_used_consumes_exactly_once() {
        let repo = MemoryVerificationTokenRepository::new();
        let token = VerificationToken::new_oauth_state(Duration::minutes(5));
        repo.save(&token).await.unwrap();

        repo.mark_used(token.token(), Utc::now()).await.unwrap();

        let err = repo.mark_used(token.token(), Utc::now()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict));

        let stored = repo.find_by_token(token.token()).await.unwrap().unwrap();
        assert!(stored.is_used());
    }

    #[tokio::test]
    async fn test_mark_used_on_unknown_token() {
        let repo = MemoryVerificationTokenRepository::new();
        let err = repo.mark_used("never-saved", Utc::now()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_cleanup_expired_removes_stale_tokens() {
        let repo = MemoryVerificationTokenRepository::new();
        let live = VerificationToken::new_oauth_state(Duration::minutes(5));
        let stale = VerificationToken::new_oauth_state(Duration::seconds(-10));
        repo.save(&live).await.unwrap();
        repo.save(&stale).await.unwrap();

        assert_eq!(repo.cleanup_expired().await.unwrap(), 1);
        assert!(repo.find_by_token(live.token()).await.unwrap().is_some());
        assert!(repo.find_by_token(stale.token()).await.unwrap().is_none());
    }
}
