use chrono::{DateTime, Utc};

use crate::domain::email::Email;
use crate::domain::ids::UserId;
use crate::domain::profile::UserProfile;
use crate::errors::IdentityError;

/// A person known to the system. Owns zero-or-more accounts (one per
/// authentication method) and refresh tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    email: Email,
    profile: UserProfile,
    is_email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// A freshly registered user. Email starts unverified.
    pub fn new(email: Email, profile: UserProfile) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email,
            profile,
            is_email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_storage(
        id: UserId,
        email: Email,
        profile: UserProfile,
        is_email_verified: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            profile,
            is_email_verified,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn is_email_verified(&self) -> bool {
        self.is_email_verified
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn update_profile(&mut self, profile: UserProfile) {
        self.profile = profile;
        self.updated_at = Utc::now();
    }

    /// Switching address resets verification.
    pub fn change_email(&mut self, email: Email) {
        self.email = email;
        self.is_email_verified = false;
        self.updated_at = Utc::now();
    }

    pub fn verify_email(&mut self) {
        self.is_email_verified = true;
        self.updated_at = Utc::now();
    }

    /// Per-user authentication gate, checked on every login path.
    ///
    /// Policy: no gate is currently applied - password-registered users may
    /// authenticate before verifying their email. This method is the single
    /// seam where a verification requirement (or a suspension flag) would be
    /// enforced if that policy changes.
    pub fn can_authenticate(&self) -> Result<(), IdentityError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            Email::parse("ada@example.com").unwrap(),
            UserProfile::new("Ada", "Lovelace").unwrap(),
        )
    }

    #[test]
    fn test_new_user_is_unverified() {
        let user = user();
        assert!(!user.is_email_verified());
        assert!(user.can_authenticate().is_ok());
    }

    #[test]
    fn test_verify_email() {
        let mut user = user();
        user.verify_email();
        assert!(user.is_email_verified());
    }

    #[test]
    fn test_change_email_resets_verification() {
        let mut user = user();
        user.verify_email();

        user.change_email(Email::parse("countess@example.com").unwrap());
        assert_eq!(user.email().as_str(), "countess@example.com");
        assert!(!user.is_email_verified());
    }

    #[test]
    fn test_update_profile() {
        let mut user = user();
        user.update_profile(UserProfile::new("Augusta", "King").unwrap());
        assert_eq!(user.profile().full_name(), "Augusta King");
    }
}
