//! HTTP client for the code operation endpoints.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::envelope::{OperationRequest, extract_payload};
use super::{ApiError, FailureCause, RemoteOperations};
use crate::models::usage::FeatureKind;

/// Endpoint URLs, one per operation. Empty means not configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoints {
    pub completion: String,
    pub refactor: String,
    pub doc_comment: String,
}

impl Endpoints {
    fn for_feature(&self, feature: FeatureKind) -> &str {
        match feature {
            FeatureKind::CodeCompletion => &self.completion,
            FeatureKind::RefactorCode => &self.refactor,
            FeatureKind::DocString => &self.doc_comment,
        }
    }
}

/// Client for the completion, refactor and doc-comment services.
///
/// No retries, no deduplication: every call is exactly one attempt.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(http: Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    async fn invoke(
        &self,
        feature: FeatureKind,
        user_id: &str,
        language: &str,
        text: &str,
    ) -> Result<String, ApiError> {
        self.try_invoke(feature, user_id, language, text)
            .await
            .map_err(|cause| {
                warn!(%feature, %cause, "remote operation failed");
                ApiError::unavailable(feature, cause)
            })
    }

    async fn try_invoke(
        &self,
        feature: FeatureKind,
        user_id: &str,
        language: &str,
        text: &str,
    ) -> Result<String, FailureCause> {
        let url = self.endpoints.for_feature(feature);
        if url.is_empty() {
            return Err(FailureCause::NotConfigured);
        }

        debug!(%feature, language, bytes = text.len(), "sending remote operation");
        let resp = self
            .http
            .post(url)
            .json(&OperationRequest {
                user_id,
                code_snippet: text,
                code_language: language,
            })
            .send()
            .await
            .map_err(|e| FailureCause::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FailureCause::Status(status.as_u16()));
        }
        let raw = resp
            .bytes()
            .await
            .map_err(|e| FailureCause::Network(e.to_string()))?;
        extract_payload(&raw, feature)
    }
}

#[async_trait]
impl RemoteOperations for ApiClient {
    async fn request_completion(
        &self,
        user_id: &str,
        language: &str,
        text: &str,
    ) -> Result<String, ApiError> {
        self.invoke(FeatureKind::CodeCompletion, user_id, language, text)
            .await
    }

    async fn request_refactor(
        &self,
        user_id: &str,
        language: &str,
        text: &str,
    ) -> Result<String, ApiError> {
        self.invoke(FeatureKind::RefactorCode, user_id, language, text)
            .await
    }

    async fn request_doc_comment(
        &self,
        user_id: &str,
        language: &str,
        text: &str,
    ) -> Result<String, ApiError> {
        self.invoke(FeatureKind::DocString, user_id, language, text)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client(server: &Server) -> ApiClient {
        let base = server.url();
        ApiClient::new(
            Client::new(),
            Endpoints {
                completion: format!("{base}/completion"),
                refactor: format!("{base}/refactor"),
                doc_comment: format!("{base}/doc"),
            },
        )
    }

    #[tokio::test]
    async fn completion_posts_snippet_and_reads_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/completion")
            .match_body(Matcher::Json(json!({
                "userId": "user-1",
                "code_snippet": "def add(a, b):",
                "code_language": "python"
            })))
            .with_status(200)
            .with_body(r#"{"statusCode":200,"body":"{\"completion_string\": \"return a + b\"}"}"#)
            .expect(1)
            .create_async()
            .await;

        let out = client(&server)
            .request_completion("user-1", "python", "def add(a, b):")
            .await
            .unwrap();
        assert_eq!(out, "return a + b");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn refactor_and_doc_use_their_own_fields() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/refactor")
            .with_status(200)
            .with_body(r#"{"statusCode":200,"body":"{\"refactored_code\": \"x = 1\"}"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/doc")
            .with_status(200)
            .with_body(r#"{"statusCode":200,"body":"{\"doc_string\": \"Sets x.\"}"}"#)
            .create_async()
            .await;

        let c = client(&server);
        assert_eq!(c.request_refactor("u", "python", "x=1").await.unwrap(), "x = 1");
        assert_eq!(c.request_doc_comment("u", "python", "x=1").await.unwrap(), "Sets x.");
    }

    #[tokio::test]
    async fn http_error_is_single_attempt_unavailable() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/completion")
            .with_status(502)
            .expect(1)
            .create_async()
            .await;

        let err = client(&server)
            .request_completion("u", "python", "x")
            .await
            .unwrap_err();
        assert_eq!(err.cause(), &FailureCause::Status(502));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn wrong_payload_field_is_malformed() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/doc")
            .with_status(200)
            .with_body(r#"{"statusCode":200,"body":"{\"completion_string\": \"x\"}"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .request_doc_comment("u", "python", "x")
            .await
            .unwrap_err();
        assert!(matches!(err.cause(), FailureCause::Malformed(_)));
    }

    #[tokio::test]
    async fn missing_endpoint_is_unavailable() {
        let c = ApiClient::new(Client::new(), Endpoints::default());
        let err = c.request_refactor("u", "python", "x").await.unwrap_err();
        assert_eq!(err.cause(), &FailureCause::NotConfigured);
        assert_eq!(
            err.to_string(),
            "refactor_code service unavailable (no endpoint configured)"
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_network_failure() {
        // Port 9 (discard) on loopback is not expected to be listening.
        let c = ApiClient::new(
            Client::new(),
            Endpoints {
                completion: "http://127.0.0.1:9/completion".to_string(),
                ..Endpoints::default()
            },
        );
        let err = c.request_completion("u", "c", "x").await.unwrap_err();
        assert!(matches!(err.cause(), FailureCause::Network(_)));
    }
}
