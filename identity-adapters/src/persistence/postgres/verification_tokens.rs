use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use identity_core::{
    RepositoryError, TokenId, TokenType, UserId, VerificationToken, VerificationTokenRepository,
};

use super::storage;

pub struct PostgresVerificationTokenRepository {
    pool: PgPool,
}

impl PostgresVerificationTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_token(row: &PgRow) -> Result<VerificationToken, RepositoryError> {
    let id = TokenId::from_uuid(row.try_get::<Uuid, _>("id").map_err(storage)?).map_err(storage)?;
    let token_type = row
        .try_get::<String, _>("token_type")
        .map_err(storage)?
        .parse::<TokenType>()
        .map_err(storage)?;
    let user_id = row
        .try_get::<Option<Uuid>, _>("user_id")
        .map_err(storage)?
        .map(UserId::from_uuid)
        .transpose()
        .map_err(storage)?;

    VerificationToken::from_storage(
        id,
        row.try_get("token").map_err(storage)?,
        token_type,
        user_id,
        row.try_get::<DateTime<Utc>, _>("expires_at").map_err(storage)?,
        row.try_get::<DateTime<Utc>, _>("created_at").map_err(storage)?,
        row.try_get::<Option<DateTime<Utc>>, _>("used_at").map_err(storage)?,
    )
    .map_err(storage)
}

#[async_trait]
impl VerificationTokenRepository for PostgresVerificationTokenRepository {
    #[tracing::instrument(name = "Saving verification token to PostgreSQL", skip_all)]
    async fn save(&self, token: &VerificationToken) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
                INSERT INTO verification_tokens (id, token, token_type, user_id, expires_at, created_at, used_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(token.id().as_uuid())
        .bind(token.token())
        .bind(token.token_type().as_str())
        .bind(token.user_id().map(|id| id.as_uuid()))
        .bind(token.expires_at())
        .bind(token.created_at())
        .bind(token.used_at())
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    #[tracing::instrument(name = "Retrieving verification token from PostgreSQL", skip_all)]
    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<VerificationToken>, RepositoryError> {
        let row = sqlx::query(
            r#"
                SELECT id, token, token_type, user_id, expires_at, created_at, used_at
                FROM verification_tokens
                WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(row_to_token).transpose()
    }

    #[tracing::instrument(name = "Consuming verification token in PostgreSQL", skip_all)]
    async fn mark_used(&self, token: &str, used_at: DateTime<Utc>) -> Result<(), RepositoryError> {
        // The WHERE clause makes consumption a single conditional write: of
        // any number of concurrent redemptions, exactly one updates a row.
        // A zero count means the token was already consumed (or vanished);
        // either way this redemption lost.
        let result = sqlx::query(
            r#"
                UPDATE verification_tokens
                SET used_at = $1
                WHERE token = $2 AND used_at IS NULL
            "#,
        )
        .bind(used_at)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Deleting verification token from PostgreSQL", skip_all)]
    async fn delete(&self, token: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM verification_tokens WHERE token = $1"#)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Cleaning up expired verification tokens", skip_all)]
    async fn cleanup_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM verification_tokens WHERE expires_at < NOW()"#)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        Ok(result.rows_affected())
    }
}
