//! Authentication: credential checks, access-token decoding and the
//! identity-provider exchange.

pub mod cognito;
pub mod email;
pub mod jwt;
pub mod password;

use thiserror::Error;

pub use cognito::{CognitoClient, IdentityProvider, SignUpOutcome};
pub use email::validate_email;
pub use password::{PasswordViolation, validate_password};

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input rejected locally; the provider was never contacted.
    #[error("{0}")]
    ValidationError(String),

    /// The provider answered and refused the request.
    #[error("Rejected by identity provider: {0}")]
    Rejected(String),

    /// Network failure, 5xx, or an unreadable provider response.
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PasswordViolation> for AuthError {
    fn from(v: PasswordViolation) -> Self {
        AuthError::ValidationError(v.to_string())
    }
}

/// Check an email/password pair before any provider call.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    validate_email(email)?;
    validate_password(password)?;
    Ok(())
}
