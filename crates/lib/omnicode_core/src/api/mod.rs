//! Remote operations: completion, refactor and doc-comment generation.
//!
//! Each operation is a single POST with at most one attempt. Every failure
//! (network, non-2xx, unreadable envelope) surfaces as
//! [`ApiError::Unavailable`]; the [`FailureCause`] is kept for diagnostics.

pub mod client;
pub mod envelope;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::usage::FeatureKind;

pub use client::{ApiClient, Endpoints};

/// Why a remote operation failed. Not load-bearing for behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    #[error("no endpoint configured")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(String),

    #[error("status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Remote operation errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{feature} service unavailable ({cause})")]
    Unavailable {
        feature: FeatureKind,
        cause: FailureCause,
    },
}

impl ApiError {
    pub fn unavailable(feature: FeatureKind, cause: FailureCause) -> Self {
        ApiError::Unavailable { feature, cause }
    }

    pub fn cause(&self) -> &FailureCause {
        match self {
            ApiError::Unavailable { cause, .. } => cause,
        }
    }
}

/// The three code operations the client can ask the service for.
#[async_trait]
pub trait RemoteOperations: Send + Sync {
    async fn request_completion(
        &self,
        user_id: &str,
        language: &str,
        text: &str,
    ) -> Result<String, ApiError>;

    async fn request_refactor(
        &self,
        user_id: &str,
        language: &str,
        text: &str,
    ) -> Result<String, ApiError>;

    async fn request_doc_comment(
        &self,
        user_id: &str,
        language: &str,
        text: &str,
    ) -> Result<String, ApiError>;
}
