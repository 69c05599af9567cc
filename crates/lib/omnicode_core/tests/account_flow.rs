use std::sync::Arc;

use jsonwebtoken::{EncodingKey, Header, encode};
use mockito::{Matcher, Server};
use omnicode_core::api::{ApiClient, Endpoints};
use omnicode_core::auth::CognitoClient;
use omnicode_core::commands::{Assistant, CommandError};
use omnicode_core::session::{FileSessionStore, SessionStore};
use serde_json::json;
use tempfile::TempDir;

fn access_token(sub: &str) -> String {
    encode(
        &Header::default(),
        &json!({ "sub": sub, "token_use": "access", "exp": 4_102_444_800u64 }),
        &EncodingKey::from_secret(b"provider-side-key"),
    )
    .unwrap()
}

fn assistant(server: &Server, dir: &TempDir) -> Assistant {
    let http = reqwest::Client::new();
    Assistant::new(
        Arc::new(CognitoClient::new(
            http.clone(),
            server.url(),
            "test-client",
        )),
        Arc::new(ApiClient::new(http, Endpoints::default())),
        Arc::new(FileSessionStore::in_dir(dir.path())),
    )
}

#[tokio::test]
async fn register_login_logout_round_trip() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let sign_up = server
        .mock("POST", "/")
        .match_header("x-amz-target", "AWSCognitoIdentityProviderService.SignUp")
        .match_body(Matcher::PartialJson(json!({
            "ClientId": "test-client",
            "Username": "a@b.com",
            "Password": "Abcdef1!"
        })))
        .with_status(200)
        .with_body(r#"{"UserSub":"0f1e2d3c","UserConfirmed":false}"#)
        .expect(1)
        .create_async()
        .await;
    let initiate = server
        .mock("POST", "/")
        .match_header(
            "x-amz-target",
            "AWSCognitoIdentityProviderService.InitiateAuth",
        )
        .match_body(Matcher::PartialJson(json!({ "AuthFlow": "USER_PASSWORD_AUTH" })))
        .with_status(200)
        .with_body(
            json!({
                "AuthenticationResult": {
                    "IdToken": "id-token",
                    "AccessToken": access_token("0f1e2d3c"),
                    "RefreshToken": "refresh-token"
                }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let a = assistant(&server, &dir);
    let outcome = a.register("a@b.com", "Abcdef1!").await.unwrap();
    assert_eq!(outcome.user_sub, "0f1e2d3c");

    assert_eq!(a.login("a@b.com", "Abcdef1!").await.unwrap(), "0f1e2d3c");
    let store = FileSessionStore::in_dir(dir.path());
    assert_eq!(store.current_user_id().as_deref(), Some("0f1e2d3c"));

    assert!(a.logout().unwrap());
    assert_eq!(store.current_user_id(), None);
    assert!(!store.path().exists());

    sign_up.assert_async().await;
    initiate.assert_async().await;
}

#[tokio::test]
async fn refused_login_keeps_previous_state() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    server
        .mock("POST", "/")
        .with_status(400)
        .with_body(r#"{"__type":"NotAuthorizedException","message":"Incorrect username or password."}"#)
        .create_async()
        .await;

    let a = assistant(&server, &dir);
    let err = a.login("a@b.com", "Abcdef1!").await.unwrap_err();
    assert!(matches!(err, CommandError::Unavailable(ref m) if m.contains("Incorrect username")));
    assert_eq!(a.whoami(), None);
}

#[tokio::test]
async fn logged_out_commands_are_refused_before_any_request() {
    let server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let a = assistant(&server, &dir);
    assert!(matches!(
        a.refactor("rust", "fn f() {}").await,
        Err(CommandError::NotLoggedIn)
    ));
}
