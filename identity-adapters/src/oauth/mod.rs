pub mod google;
pub mod spotify;

use serde::Deserialize;

/// Body of a successful code-exchange response, shared by both providers.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: i64,
}
