use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use identity_core::{RefreshToken, RefreshTokenRepository, RepositoryError, TokenId, UserId};

use super::storage;

pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_token(row: &PgRow) -> Result<RefreshToken, RepositoryError> {
    let id = TokenId::from_uuid(row.try_get::<Uuid, _>("id").map_err(storage)?).map_err(storage)?;
    let user_id =
        UserId::from_uuid(row.try_get::<Uuid, _>("user_id").map_err(storage)?).map_err(storage)?;

    RefreshToken::from_storage(
        id,
        user_id,
        row.try_get("token").map_err(storage)?,
        row.try_get::<DateTime<Utc>, _>("expires_at").map_err(storage)?,
        row.try_get::<DateTime<Utc>, _>("created_at").map_err(storage)?,
    )
    .map_err(storage)
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    #[tracing::instrument(name = "Saving refresh token to PostgreSQL", skip_all)]
    async fn save(&self, token: &RefreshToken) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
                INSERT INTO refresh_tokens (id, user_id, token, expires_at, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (token) DO UPDATE SET
                    expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(token.id().as_uuid())
        .bind(token.user_id().as_uuid())
        .bind(token.token())
        .bind(token.expires_at())
        .bind(token.created_at())
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    #[tracing::instrument(name = "Retrieving refresh token from PostgreSQL", skip_all)]
    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, RepositoryError> {
        let row = sqlx::query(
            r#"
                SELECT id, user_id, token, expires_at, created_at
                FROM refresh_tokens
                WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(row_to_token).transpose()
    }

    #[tracing::instrument(name = "Deleting refresh token from PostgreSQL", skip_all)]
    async fn delete(&self, token: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM refresh_tokens WHERE token = $1"#)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Deleting user refresh tokens from PostgreSQL", skip_all)]
    async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM refresh_tokens WHERE user_id = $1"#)
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "Cleaning up expired refresh tokens", skip_all)]
    async fn cleanup_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM refresh_tokens WHERE expires_at < NOW()"#)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        Ok(result.rows_affected())
    }
}
