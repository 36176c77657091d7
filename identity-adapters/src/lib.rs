pub mod auth;
pub mod config;
pub mod oauth;
pub mod persistence;
pub mod telemetry;

// Re-export the concrete adapters for convenience
pub use auth::jwt_token_generator::JwtTokenGenerator;
pub use config::Settings;
pub use oauth::{google::GoogleOAuthProvider, spotify::SpotifyOAuthProvider};
pub use persistence::memory::{
    MemoryAccountRepository, MemoryRefreshTokenRepository, MemoryUserRepository,
    MemoryVerificationTokenRepository,
};
pub use persistence::postgres::{
    PostgresAccountRepository, PostgresRefreshTokenRepository, PostgresUserRepository,
    PostgresVerificationTokenRepository,
};
