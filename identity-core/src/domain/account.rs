use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{AccountId, UserId};
use crate::domain::password::HashedPassword;
use crate::errors::IdentityError;

/// Authentication method backing an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Userpass,
    Google,
    Spotify,
    Apple,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Userpass => "userpass",
            Self::Google => "google",
            Self::Spotify => "spotify",
            Self::Apple => "apple",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "userpass" => Ok(Self::Userpass),
            "google" => Ok(Self::Google),
            "spotify" => Ok(Self::Spotify),
            "apple" => Ok(Self::Apple),
            _ => Err(IdentityError::domain(
                "invalid_provider",
                "Invalid account provider",
            )),
        }
    }
}

/// One authentication method bound to exactly one user. A user owns at most
/// one account per provider; the password is present iff the provider is
/// `Userpass`.
#[derive(Debug, Clone)]
pub struct Account {
    id: AccountId,
    user_id: UserId,
    provider: Provider,
    password: Option<HashedPassword>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new_userpass(user_id: UserId, password: HashedPassword) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            user_id,
            provider: Provider::Userpass,
            password: Some(password),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn new_oauth(user_id: UserId, provider: Provider) -> Result<Self, IdentityError> {
        if provider == Provider::Userpass {
            return Err(IdentityError::domain(
                "invalid_provider",
                "Cannot create OAuth account with userpass provider",
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: AccountId::new(),
            user_id,
            provider,
            password: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn from_storage(
        id: AccountId,
        user_id: UserId,
        provider: Provider,
        password: Option<HashedPassword>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, IdentityError> {
        match (provider, &password) {
            (Provider::Userpass, None) => {
                return Err(IdentityError::domain(
                    "invalid_account_state",
                    "Userpass account is missing its password hash",
                ));
            }
            (Provider::Userpass, Some(_)) => {}
            (_, Some(_)) => {
                return Err(IdentityError::domain(
                    "invalid_account_state",
                    "Only userpass accounts carry a password hash",
                ));
            }
            (_, None) => {}
        }

        Ok(Self {
            id,
            user_id,
            provider,
            password,
            created_at,
            updated_at,
        })
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn password(&self) -> Option<&HashedPassword> {
        self.password.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_userpass(&self) -> bool {
        self.provider == Provider::Userpass
    }

    pub fn change_password(&mut self, new_password: HashedPassword) -> Result<(), IdentityError> {
        if !self.is_userpass() {
            return Err(IdentityError::domain(
                "invalid_operation",
                "Cannot change password for non-userpass account",
            ));
        }

        self.password = Some(new_password);
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::Secret;

    use super::*;
    use crate::domain::password::PlainPassword;

    fn hashed(raw: &str) -> HashedPassword {
        PlainPassword::try_from(Secret::from(raw.to_string()))
            .unwrap()
            .hash()
            .unwrap()
    }

    #[test]
    fn test_provider_round_trip() {
        for provider in [
            Provider::Userpass,
            Provider::Google,
            Provider::Spotify,
            Provider::Apple,
        ] {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
        assert!("github".parse::<Provider>().is_err());
    }

    #[test]
    fn test_userpass_account_has_password() {
        let account = Account::new_userpass(UserId::new(), hashed("password123"));
        assert!(account.is_userpass());
        assert!(account.password().is_some());
    }

    #[test]
    fn test_oauth_account_rejects_userpass_provider() {
        let err = Account::new_oauth(UserId::new(), Provider::Userpass).unwrap_err();
        assert_eq!(err.code(), "invalid_provider");
    }

    #[test]
    fn test_change_password_requires_userpass() {
        let mut oauth = Account::new_oauth(UserId::new(), Provider::Spotify).unwrap();
        let err = oauth.change_password(hashed("password123")).unwrap_err();
        assert_eq!(err.code(), "invalid_operation");

        let mut userpass = Account::new_userpass(UserId::new(), hashed("password123"));
        assert!(userpass.change_password(hashed("new-password-1")).is_ok());
    }

    #[test]
    fn test_from_storage_enforces_password_pairing() {
        let now = Utc::now();

        let err = Account::from_storage(
            AccountId::new(),
            UserId::new(),
            Provider::Userpass,
            None,
            now,
            now,
        )
        .unwrap_err();
        assert_eq!(err.code(), "invalid_account_state");

        let err = Account::from_storage(
            AccountId::new(),
            UserId::new(),
            Provider::Google,
            Some(hashed("password123")),
            now,
            now,
        )
        .unwrap_err();
        assert_eq!(err.code(), "invalid_account_state");
    }
}
