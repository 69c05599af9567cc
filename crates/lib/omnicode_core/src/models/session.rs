//! Session domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token bundle returned by the identity provider after a successful login.
///
/// Field names follow the provider's `AuthenticationResult` shape so the
/// persisted form matches what the provider hands back.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionTokens {
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl SessionTokens {
    pub fn new(
        id_token: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            id_token: id_token.into(),
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// A bundle missing any of its three tokens is treated as no session.
    pub fn is_complete(&self) -> bool {
        !self.id_token.is_empty() && !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("id_token", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// The only access-token claim the client reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectClaims {
    /// Subject, the stable user ID (standard JWT `sub` claim).
    pub sub: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_provider_field_names() {
        let tokens = SessionTokens::new("id", "access", "refresh");
        let json = serde_json::to_value(&tokens).unwrap();
        assert_eq!(json["IdToken"], "id");
        assert_eq!(json["AccessToken"], "access");
        assert_eq!(json["RefreshToken"], "refresh");
    }

    #[test]
    fn empty_token_makes_bundle_incomplete() {
        assert!(SessionTokens::new("id", "access", "refresh").is_complete());
        assert!(!SessionTokens::new("id", "", "refresh").is_complete());
    }

    #[test]
    fn debug_does_not_leak_tokens() {
        let tokens = SessionTokens::new("id-secret", "access-secret", "refresh-secret");
        let out = format!("{tokens:?}");
        assert!(!out.contains("secret"));
    }
}
