pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

pub use use_cases::{
    link_account::{LinkAccountRequest, LinkAccountResponse, LinkAccountUseCase},
    login::{LoginRequest, LoginResponse, LoginUseCase},
    oauth_login::{OAuthCallbackRequest, OAuthCallbackResponse, OAuthLoginUseCase},
    oauth_url::{OAuthUrlResponse, OAuthUrlUseCase},
    register::{RegisterRequest, RegisterResponse, RegisterUseCase},
    verify_frontend::{VerifyFrontendRequest, VerifyFrontendResponse, VerifyFrontendUseCase},
};
