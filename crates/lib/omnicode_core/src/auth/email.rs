//! Email address format check.

use std::sync::LazyLock;

use regex::Regex;

use super::AuthError;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*@([A-Za-z0-9_-]+\.)+[a-zA-Z]{2,7}$")
        .expect("valid email regex")
});

/// Reject anything that does not look like `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(AuthError::ValidationError(
            "Please enter a valid email address.".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_addresses() {
        for ok in ["a@b.com", "first.last@mail.example.org", "x_y-z@host-1.io"] {
            assert!(validate_email(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "plain", "@b.com", "a@b", "a@b.c", "a b@c.com", "a@b.toolongtld"] {
            assert!(validate_email(bad).is_err(), "{bad}");
        }
    }
}
