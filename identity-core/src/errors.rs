use thiserror::Error;

/// The four error kinds every use case selects among. Each carries a stable
/// machine-readable code and a human message; the transport layer maps the
/// kind to a status code and renders `{error_code, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Generic domain invariant violation.
    #[error("[{code}] {message}")]
    Domain { code: String, message: String },
    /// Credential or identity failure.
    #[error("[{code}] {message}")]
    Authentication { code: String, message: String },
    /// Field-level input failure.
    #[error("[{code}] {field}: {message}")]
    Validation {
        field: String,
        code: String,
        message: String,
    },
    /// Missing resource.
    #[error("[not_found] {message}")]
    NotFound { resource: String, message: String },
}

impl IdentityError {
    pub fn domain(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Domain {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn authentication(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn validation(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &str {
        match self {
            Self::Domain { code, .. }
            | Self::Authentication { code, .. }
            | Self::Validation { code, .. } => code,
            Self::NotFound { .. } => "not_found",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Domain { message, .. }
            | Self::Authentication { message, .. }
            | Self::Validation { message, .. }
            | Self::NotFound { message, .. } => message,
        }
    }
}
