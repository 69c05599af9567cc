//! Identity provider exchange over the Cognito JSON API.
//!
//! Only the unauthenticated user-pool operations are used (`SignUp`,
//! `ConfirmSignUp`, `InitiateAuth` with `USER_PASSWORD_AUTH`), so requests are
//! plain JSON posts without request signing.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::AuthError;
use crate::models::session::SessionTokens;

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// Subject of the newly created user.
    pub user_sub: String,
    /// Whether the account still needs a verification code.
    pub needs_confirmation: bool,
}

/// The identity exchange the client depends on.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account.
    async fn register(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;

    /// Confirm an account with the code the provider sent by email.
    async fn confirm(&self, email: &str, code: &str) -> Result<(), AuthError>;

    /// Exchange credentials for a token bundle.
    async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, AuthError>;
}

/// Cognito user-pool client.
#[derive(Debug, Clone)]
pub struct CognitoClient {
    http: Client,
    endpoint: String,
    client_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AttributeType<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpRequest<'a> {
    client_id: &'a str,
    username: &'a str,
    password: &'a str,
    user_attributes: Vec<AttributeType<'a>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpResponse {
    user_sub: String,
    #[serde(default)]
    user_confirmed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ConfirmSignUpRequest<'a> {
    client_id: &'a str,
    username: &'a str,
    confirmation_code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct AuthParameters<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Error body returned with 4xx/5xx responses.
#[derive(Deserialize, Default)]
struct ProviderErrorBody {
    #[serde(rename = "__type", default)]
    kind: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

impl ProviderErrorBody {
    fn describe(&self) -> String {
        // `__type` may be namespaced, e.g. "com.amazonaws...#NotAuthorizedException".
        let kind = self
            .kind
            .as_deref()
            .map(|k| k.rsplit('#').next().unwrap_or(k));
        match (kind, self.message.as_deref()) {
            (Some(k), Some(m)) => format!("{k}: {m}"),
            (Some(k), None) => k.to_string(),
            (None, Some(m)) => m.to_string(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

impl CognitoClient {
    pub fn new(http: Client, endpoint: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            client_id: client_id.into(),
        }
    }

    /// Default regional endpoint, e.g. `https://cognito-idp.us-east-2.amazonaws.com/`.
    pub fn regional_endpoint(region: &str) -> String {
        format!("https://cognito-idp.{region}.amazonaws.com/")
    }

    fn ensure_configured(&self) -> Result<(), AuthError> {
        if self.client_id.is_empty() {
            return Err(AuthError::ConfigError(
                "AWS_COGNITO_APP_CLIENT_ID is not set".to_string(),
            ));
        }
        Ok(())
    }

    /// Invoke one user-pool operation.
    async fn call<B, R>(&self, operation: &str, body: &B) -> Result<R, AuthError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        self.ensure_configured()?;
        let payload = serde_json::to_vec(body)
            .map_err(|e| AuthError::Internal(format!("{operation} encode: {e}")))?;

        let resp = self
            .http
            .post(&self.endpoint)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{operation}"))
            .header("Content-Type", CONTENT_TYPE)
            .body(payload)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(format!("{operation} request failed: {e}")))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AuthError::Unavailable(format!("{operation} body read failed: {e}")))?;

        if !status.is_success() {
            let err: ProviderErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            debug!(operation, %status, "identity provider returned an error");
            return Err(if status.is_client_error() {
                AuthError::Rejected(err.describe())
            } else {
                AuthError::Unavailable(format!("{operation} failed: {status}"))
            });
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::Unavailable(format!("{operation} response parse error: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    async fn register(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let resp: SignUpResponse = self
            .call(
                "SignUp",
                &SignUpRequest {
                    client_id: &self.client_id,
                    username: email,
                    password,
                    user_attributes: vec![AttributeType {
                        name: "email",
                        value: email,
                    }],
                },
            )
            .await?;
        info!(user_sub = %resp.user_sub, "user registered");
        Ok(SignUpOutcome {
            user_sub: resp.user_sub,
            needs_confirmation: !resp.user_confirmed,
        })
    }

    async fn confirm(&self, email: &str, code: &str) -> Result<(), AuthError> {
        if code.trim().is_empty() {
            return Err(AuthError::ValidationError(
                "Verification code must not be empty.".to_string(),
            ));
        }
        let _: serde_json::Value = self
            .call(
                "ConfirmSignUp",
                &ConfirmSignUpRequest {
                    client_id: &self.client_id,
                    username: email,
                    confirmation_code: code.trim(),
                },
            )
            .await?;
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, AuthError> {
        let resp: InitiateAuthResponse = self
            .call(
                "InitiateAuth",
                &InitiateAuthRequest {
                    auth_flow: "USER_PASSWORD_AUTH",
                    client_id: &self.client_id,
                    auth_parameters: AuthParameters {
                        username: email,
                        password,
                    },
                },
            )
            .await?;

        let Some(result) = resp.authentication_result else {
            let challenge = resp.challenge_name.unwrap_or_else(|| "none".to_string());
            return Err(AuthError::Rejected(format!(
                "login requires unsupported challenge: {challenge}"
            )));
        };

        match (result.id_token, result.access_token, result.refresh_token) {
            (Some(id), Some(access), Some(refresh)) => {
                let tokens = SessionTokens::new(id, access, refresh);
                if tokens.is_complete() {
                    Ok(tokens)
                } else {
                    Err(AuthError::Unavailable("login returned empty tokens".to_string()))
                }
            }
            _ => Err(AuthError::Unavailable(
                "login response is missing tokens".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client(server: &Server) -> CognitoClient {
        CognitoClient::new(Client::new(), server.url(), "app-client")
    }

    #[tokio::test]
    async fn register_posts_sign_up() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-amz-target", "AWSCognitoIdentityProviderService.SignUp")
            .match_body(Matcher::PartialJson(json!({
                "ClientId": "app-client",
                "Username": "a@b.com",
                "UserAttributes": [{ "Name": "email", "Value": "a@b.com" }]
            })))
            .with_status(200)
            .with_body(r#"{"UserSub":"sub-1","UserConfirmed":false}"#)
            .create_async()
            .await;

        let outcome = client(&server).register("a@b.com", "Abcdef1!").await.unwrap();
        assert_eq!(outcome.user_sub, "sub-1");
        assert!(outcome.needs_confirmation);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn login_returns_token_bundle() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .match_header(
                "x-amz-target",
                "AWSCognitoIdentityProviderService.InitiateAuth",
            )
            .match_body(Matcher::PartialJson(json!({
                "AuthFlow": "USER_PASSWORD_AUTH",
                "AuthParameters": { "USERNAME": "a@b.com", "PASSWORD": "Abcdef1!" }
            })))
            .with_status(200)
            .with_body(
                r#"{"AuthenticationResult":{"IdToken":"i","AccessToken":"a","RefreshToken":"r","ExpiresIn":3600}}"#,
            )
            .create_async()
            .await;

        let tokens = client(&server).login("a@b.com", "Abcdef1!").await.unwrap();
        assert_eq!(tokens, SessionTokens::new("i", "a", "r"));
    }

    #[tokio::test]
    async fn login_without_refresh_token_fails() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"AuthenticationResult":{"IdToken":"i","AccessToken":"a"}}"#)
            .create_async()
            .await;

        let err = client(&server).login("a@b.com", "Abcdef1!").await.unwrap_err();
        assert!(matches!(err, AuthError::Unavailable(_)));
    }

    #[tokio::test]
    async fn provider_rejection_carries_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(400)
            .with_body(r#"{"__type":"NotAuthorizedException","message":"Incorrect username or password."}"#)
            .create_async()
            .await;

        let err = client(&server).login("a@b.com", "Abcdef1!").await.unwrap_err();
        match err {
            AuthError::Rejected(msg) => {
                assert_eq!(msg, "NotAuthorizedException: Incorrect username or password.")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(503)
            .create_async()
            .await;

        let err = client(&server).confirm("a@b.com", "123456").await.unwrap_err();
        assert!(matches!(err, AuthError::Unavailable(_)));
    }

    #[tokio::test]
    async fn missing_client_id_is_config_error() {
        let c = CognitoClient::new(Client::new(), "http://127.0.0.1:9", "");
        let err = c.login("a@b.com", "Abcdef1!").await.unwrap_err();
        assert!(matches!(err, AuthError::ConfigError(_)));
    }

    #[test]
    fn namespaced_error_type_is_trimmed() {
        let body = ProviderErrorBody {
            kind: Some("com.amazon#UsernameExistsException".to_string()),
            message: None,
        };
        assert_eq!(body.describe(), "UsernameExistsException");
    }
}
