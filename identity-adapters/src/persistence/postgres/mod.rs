//! PostgreSQL repository implementations over `sqlx`.
//!
//! Queries are runtime-bound so the crate builds without a live database;
//! the schema lives in `migrations/`. Multi-write sequences (register, the
//! OAuth callback) should run on a pool whose isolation keeps a user and
//! its paired account together - see the schema's foreign keys.

pub mod accounts;
pub mod refresh_tokens;
pub mod users;
pub mod verification_tokens;

pub use accounts::PostgresAccountRepository;
pub use refresh_tokens::PostgresRefreshTokenRepository;
pub use users::PostgresUserRepository;
pub use verification_tokens::PostgresVerificationTokenRepository;

use identity_core::RepositoryError;

pub(crate) fn storage(e: impl ToString) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}
