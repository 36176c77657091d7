use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::IdentityError;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// A validated, case-normalized email address.
///
/// Construction trims surrounding whitespace and lower-cases the value, so
/// two spellings of the same address always compare equal and hit the same
/// storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let email = raw.trim().to_lowercase();

        if email.is_empty() {
            return Err(IdentityError::domain("empty_email", "Email cannot be empty"));
        }

        if email.len() > 254 {
            return Err(IdentityError::domain(
                "email_too_long",
                "Email cannot exceed 254 characters",
            ));
        }

        if !EMAIL_REGEX.is_match(&email) {
            return Err(IdentityError::domain(
                "invalid_email",
                "Email format is invalid",
            ));
        }

        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after the `@`.
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, d)| d).unwrap_or("")
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
