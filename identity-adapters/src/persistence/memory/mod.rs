//! In-memory repository implementations.
//!
//! Reference implementations of the storage contracts, used directly in
//! tests and small deployments. State is shared through `Arc`ed concurrent
//! maps, so the handles are cheap to clone.

pub mod accounts;
pub mod refresh_tokens;
pub mod users;
pub mod verification_tokens;

pub use accounts::MemoryAccountRepository;
pub use refresh_tokens::MemoryRefreshTokenRepository;
pub use users::MemoryUserRepository;
pub use verification_tokens::MemoryVerificationTokenRepository;
