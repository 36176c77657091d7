use serde::{Deserialize, Serialize};

use crate::errors::IdentityError;

/// Display name pair attached to a user. Both parts are trimmed and must be
/// 2-50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    name: String,
    last_name: String,
}

impl UserProfile {
    pub fn new(name: &str, last_name: &str) -> Result<Self, IdentityError> {
        let name = validate_part("name", name)?;
        let last_name = validate_part("last_name", last_name)?;

        Ok(Self { name, last_name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }
}

fn validate_part(field: &str, value: &str) -> Result<String, IdentityError> {
    let value = value.trim();
    let len = value.chars().count();

    if len == 0 {
        return Err(IdentityError::validation(
            field,
            format!("empty_{field}"),
            format!("{field} cannot be empty"),
        ));
    }
    if len < 2 {
        return Err(IdentityError::validation(
            field,
            format!("{field}_too_short"),
            format!("{field} must be at least 2 characters"),
        ));
    }
    if len > 50 {
        return Err(IdentityError::validation(
            field,
            format!("{field}_too_long"),
            format!("{field} cannot exceed 50 characters"),
        ));
    }

    Ok(value.to_string())
}
