pub mod domain;
pub mod errors;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    account::{Account, Provider},
    email::Email,
    ids::{AccountId, TokenId, UserId},
    password::{HashedPassword, PlainPassword},
    profile::UserProfile,
    refresh_token::RefreshToken,
    user::User,
    verification_token::{TokenType, VerificationToken},
};

pub use errors::IdentityError;

pub use ports::{
    oauth::{OAuthProvider, ProviderError, ProviderTokens, ProviderUser},
    repositories::{
        AccountRepository, RefreshTokenRepository, RepositoryError, UserRepository,
        VerificationTokenRepository,
    },
    token::{TokenGenerator, TokenGeneratorError},
};
