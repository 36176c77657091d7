use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use identity_core::{Email, RepositoryError, User, UserId, UserProfile, UserRepository};

use super::storage;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &PgRow) -> Result<User, RepositoryError> {
    let id = UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(storage)?).map_err(storage)?;
    let email = Email::parse(&row.try_get::<String, _>("email").map_err(storage)?).map_err(storage)?;
    let profile = UserProfile::new(
        &row.try_get::<String, _>("name").map_err(storage)?,
        &row.try_get::<String, _>("last_name").map_err(storage)?,
    )
    .map_err(storage)?;

    Ok(User::from_storage(
        id,
        email,
        profile,
        row.try_get("is_email_verified").map_err(storage)?,
        row.try_get::<DateTime<Utc>, _>("created_at").map_err(storage)?,
        row.try_get::<DateTime<Utc>, _>("updated_at").map_err(storage)?,
    ))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(name = "Saving user to PostgreSQL", skip_all)]
    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
                INSERT INTO users (id, email, name, last_name, is_email_verified, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO UPDATE SET
                    email = EXCLUDED.email,
                    name = EXCLUDED.name,
                    last_name = EXCLUDED.last_name,
                    is_email_verified = EXCLUDED.is_email_verified,
                    updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email().as_str())
        .bind(user.profile().name())
        .bind(user.profile().last_name())
        .bind(user.is_email_verified())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    #[tracing::instrument(name = "Retrieving user by id from PostgreSQL", skip_all)]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            r#"
                SELECT id, email, name, last_name, is_email_verified, created_at, updated_at
                FROM users
                WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(row_to_user).transpose()
    }

    #[tracing::instrument(name = "Retrieving user by email from PostgreSQL", skip_all)]
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            r#"
                SELECT id, email, name, last_name, is_email_verified, created_at, updated_at
                FROM users
                WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(row_to_user).transpose()
    }

    #[tracing::instrument(name = "Checking email existence in PostgreSQL", skip_all)]
    async fn exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>(r#"SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)"#)
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(storage)
    }

    #[tracing::instrument(name = "Deleting user from PostgreSQL", skip_all)]
    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
