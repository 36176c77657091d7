use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::IdentityError;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap a stored UUID. The nil UUID is never a valid identity.
            pub fn from_uuid(id: Uuid) -> Result<Self, IdentityError> {
                if id.is_nil() {
                    return Err(IdentityError::domain("invalid_id", "ID cannot be nil"));
                }
                Ok(Self(id))
            }

            pub fn parse(raw: &str) -> Result<Self, IdentityError> {
                let id = Uuid::parse_str(raw)
                    .map_err(|_| IdentityError::domain("invalid_id_format", "Invalid ID format"))?;
                Self::from_uuid(id)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`User`](crate::domain::user::User).
    UserId
);
entity_id!(
    /// Identifier of an [`Account`](crate::domain::account::Account).
    AccountId
);
entity_id!(
    /// Identifier of a refresh or verification token record.
    TokenId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        let id = UserId::new();
        let parsed = UserId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = UserId::parse("not-a-uuid").unwrap_err();
        assert_eq!(err.code(), "invalid_id_format");
    }

    #[test]
    fn test_nil_is_rejected() {
        let err = TokenId::from_uuid(Uuid::nil()).unwrap_err();
        assert_eq!(err.code(), "invalid_id");
    }
}
