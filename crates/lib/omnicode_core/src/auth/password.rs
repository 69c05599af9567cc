//! Password policy: the identity provider's default rules, checked locally.

use thiserror::Error;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// First rule a candidate password breaks. Rules are checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordViolation {
    #[error("Password must be at least 8 characters long.")]
    TooShort,

    #[error("Password must contain at least one uppercase letter.")]
    MissingUppercase,

    #[error("Password must contain at least one lowercase letter.")]
    MissingLowercase,

    #[error("Password must contain at least one digit.")]
    MissingDigit,

    #[error("Password must contain at least one special character (e.g., @, $, #, etc.).")]
    MissingSpecial,
}

/// Validate a candidate password, short-circuiting on the first broken rule.
pub fn validate_password(password: &str) -> Result<(), PasswordViolation> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordViolation::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordViolation::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordViolation::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordViolation::MissingDigit);
    }
    // Anything outside [A-Za-z0-9] counts, underscore included.
    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        return Err(PasswordViolation::MissingSpecial);
    }
    Ok(())
}
