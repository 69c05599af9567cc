//! Retrieve the per-user summary object through a presigned URL.

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::DashboardError;
use super::presign::PresignedUrl;
use crate::models::usage::DashboardSummary;

/// Fetches dashboard summaries. One attempt per call.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: Client,
}

impl DashboardClient {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// `GET` the summary behind `url`.
    ///
    /// A URL that has already expired at `now` is refused locally, and a
    /// `403` from the store is reported the same way.
    pub async fn fetch(
        &self,
        url: &PresignedUrl,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary, DashboardError> {
        if url.is_expired(now) {
            return Err(DashboardError::AccessDenied(format!(
                "presigned URL expired at {}",
                url.expires_at().to_rfc3339()
            )));
        }

        let resp = self
            .http
            .get(&url.url)
            .send()
            .await
            .map_err(|e| DashboardError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::FORBIDDEN {
            warn!("dashboard object refused the presigned URL");
            return Err(DashboardError::AccessDenied(
                "presigned URL was refused".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(DashboardError::Unavailable(format!("HTTP {status}")));
        }

        let raw = resp
            .bytes()
            .await
            .map_err(|e| DashboardError::Unavailable(e.to_string()))?;
        let summary: DashboardSummary =
            serde_json::from_slice(&raw).map_err(|e| DashboardError::Malformed(e.to_string()))?;
        debug!(
            languages = summary.code_languages.len(),
            days = summary.requests.len(),
            "dashboard summary fetched"
        );
        Ok(summary)
    }
}
