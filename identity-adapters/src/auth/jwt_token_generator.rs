use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Validation, decode, encode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use identity_core::{Email, TokenGenerator, TokenGeneratorError, UserId};

/// HS256 signer implementing the token-generator port.
#[derive(Clone)]
pub struct JwtTokenGenerator {
    secret: Secret<String>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub user_id: String,
    pub email: String,
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub user_id: String,
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
}

impl JwtTokenGenerator {
    pub fn new(secret: Secret<String>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret,
            access_ttl,
            refresh_ttl,
        }
    }

    fn sign<C: Serialize>(&self, claims: &C) -> Result<String, TokenGeneratorError> {
        encode(
            &jsonwebtoken::Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| TokenGeneratorError::Signing(e.to_string()))
    }

    /// Decode and validate an access token issued by this generator.
    pub fn decode_access_token(
        &self,
        token: &str,
    ) -> Result<AccessTokenClaims, TokenGeneratorError> {
        decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| TokenGeneratorError::Invalid(e.to_string()))
    }
}

impl TokenGenerator for JwtTokenGenerator {
    fn access_token(&self, user_id: UserId, email: &Email) -> Result<String, TokenGeneratorError> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            sub: user_id.to_string(),
            exp: (now + self.access_ttl).timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
        };
        self.sign(&claims)
    }

    fn refresh_token(&self, user_id: UserId) -> Result<String, TokenGeneratorError> {
        let now = Utc::now();
        let claims = RefreshTokenClaims {
            user_id: user_id.to_string(),
            sub: user_id.to_string(),
            exp: (now + self.refresh_ttl).timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
        };
        self.sign(&claims)
    }

    fn refresh_token_expiration(&self) -> Duration {
        self.refresh_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> JwtTokenGenerator {
        JwtTokenGenerator::new(
            Secret::from("test-secret".to_string()),
            Duration::minutes(15),
            Duration::days(30),
        )
    }

    #[test]
    fn test_access_token_round_trip() {
        let generator = generator();
        let user_id = UserId::new();
        let email = Email::parse("ada@example.com").unwrap();

        let token = generator.access_token(user_id, &email).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = generator.decode_access_token(&token).unwrap();
        assert_eq!(claims.user_id, user_id.to_string());
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "ada@example.com");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_refresh_tokens_are_distinct_from_access_tokens() {
        let generator = generator();
        let user_id = UserId::new();
        let email = Email::parse("ada@example.com").unwrap();

        let access = generator.access_token(user_id, &email).unwrap();
        let refresh = generator.refresh_token(user_id).unwrap();
        assert_ne!(access, refresh);
        assert_eq!(generator.refresh_token_expiration(), Duration::days(30));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let generator = generator();
        let other = JwtTokenGenerator::new(
            Secret::from("other-secret".to_string()),
            Duration::minutes(15),
            Duration::days(30),
        );

        let token = generator
            .access_token(UserId::new(), &Email::parse("ada@example.com").unwrap())
            .unwrap();
        assert!(other.decode_access_token(&token).is_err());
        assert!(generator.decode_access_token("not-a-jwt").is_err());
    }
}
