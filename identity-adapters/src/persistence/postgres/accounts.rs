use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use identity_core::{
    Account, AccountId, AccountRepository, Email, HashedPassword, Provider, RepositoryError,
    UserId,
};

use super::storage;

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_account(row: &PgRow) -> Result<Account, RepositoryError> {
    let id =
        AccountId::from_uuid(row.try_get::<Uuid, _>("id").map_err(storage)?).map_err(storage)?;
    let user_id =
        UserId::from_uuid(row.try_get::<Uuid, _>("user_id").map_err(storage)?).map_err(storage)?;
    let provider = row
        .try_get::<String, _>("provider")
        .map_err(storage)?
        .parse::<Provider>()
        .map_err(storage)?;
    let password = row
        .try_get::<Option<String>, _>("password_hash")
        .map_err(storage)?
        .map(|hash| HashedPassword::from_phc(Secret::from(hash)))
        .transpose()
        .map_err(storage)?;

    Account::from_storage(
        id,
        user_id,
        provider,
        password,
        row.try_get::<DateTime<Utc>, _>("created_at").map_err(storage)?,
        row.try_get::<DateTime<Utc>, _>("updated_at").map_err(storage)?,
    )
    .map_err(storage)
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    #[tracing::instrument(name = "Saving account to PostgreSQL", skip_all)]
    async fn save(&self, account: &Account) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
                INSERT INTO accounts (id, user_id, provider, password_hash, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id) DO UPDATE SET
                    password_hash = EXCLUDED.password_hash,
                    updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(account.id().as_uuid())
        .bind(account.user_id().as_uuid())
        .bind(account.provider().as_str())
        .bind(account.password().map(|p| p.as_secret().expose_secret().clone()))
        .bind(account.created_at())
        .bind(account.updated_at())
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    #[tracing::instrument(name = "Retrieving account from PostgreSQL", skip_all)]
    async fn find_by_user_and_provider(
        &self,
        user_id: UserId,
        provider: Provider,
    ) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query(
            r#"
                SELECT id, user_id, provider, password_hash, created_at, updated_at
                FROM accounts
                WHERE user_id = $1 AND provider = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(provider.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(row_to_account).transpose()
    }

    #[tracing::instrument(name = "Retrieving userpass account by email from PostgreSQL", skip_all)]
    async fn find_userpass_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query(
            r#"
                SELECT a.id, a.user_id, a.provider, a.password_hash, a.created_at, a.updated_at
                FROM accounts a
                JOIN users u ON u.id = a.user_id
                WHERE u.email = $1 AND a.provider = 'userpass'
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(row_to_account).transpose()
    }

    #[tracing::instrument(name = "Deleting account from PostgreSQL", skip_all)]
    async fn delete(&self, id: AccountId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM accounts WHERE id = $1"#)
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
