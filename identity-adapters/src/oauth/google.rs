use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Url;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use identity_core::{OAuthProvider, Provider, ProviderError, ProviderTokens, ProviderUser};

use super::TokenResponse;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const SCOPES: &str =
    "https://www.googleapis.com/auth/userinfo.email https://www.googleapis.com/auth/userinfo.profile";

/// Google implementation of the provider port.
pub struct GoogleOAuthProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: Secret<String>,
    redirect_url: String,
    auth_endpoint: Url,
    token_endpoint: Url,
    userinfo_endpoint: Url,
}

impl GoogleOAuthProvider {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Secret<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret,
            redirect_url: redirect_url.into(),
            auth_endpoint: Url::parse(AUTH_ENDPOINT).expect("static endpoint URL"),
            token_endpoint: Url::parse(TOKEN_ENDPOINT).expect("static endpoint URL"),
            userinfo_endpoint: Url::parse(USERINFO_ENDPOINT).expect("static endpoint URL"),
        }
    }

    /// Point the provider at non-default endpoints (mock servers).
    pub fn with_endpoints(mut self, auth: Url, token: Url, userinfo: Url) -> Self {
        self.auth_endpoint = auth;
        self.token_endpoint = token;
        self.userinfo_endpoint = userinfo;
        self
    }
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: Option<String>,
    #[serde(default)]
    given_name: String,
    #[serde(default)]
    family_name: String,
}

#[async_trait]
impl OAuthProvider for GoogleOAuthProvider {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn auth_url(&self, state: &str) -> String {
        let mut url = self.auth_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("access_type", "offline")
            .append_pair("state", state);
        url.to_string()
    }

    #[tracing::instrument(name = "Exchanging code with Google", skip_all)]
    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, ProviderError> {
        let response = self
            .client
            .post(self.token_endpoint.clone())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("redirect_uri", self.redirect_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let grant: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(ProviderTokens {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: Utc::now() + Duration::seconds(grant.expires_in),
        })
    }

    #[tracing::instrument(name = "Fetching Google user info", skip_all)]
    async fn user_info(&self, access_token: &str) -> Result<ProviderUser, ProviderError> {
        let info: GoogleUserInfo = self
            .client
            .get(self.userinfo_endpoint.clone())
            .header("Accept", "application/json")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| ProviderError::Http(e.to_string()))?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(ProviderUser {
            email: info.email,
            given_name: info.given_name,
            family_name: info.family_name,
        })
    }
}
