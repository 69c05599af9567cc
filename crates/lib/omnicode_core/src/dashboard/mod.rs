//! Usage dashboard: presigned delivery of the summary object and the two
//! chart descriptions drawn from it.

pub mod charts;
pub mod fetch;
pub mod html;
pub mod presign;

use thiserror::Error;

pub use charts::{Chart, ChartKind, DashboardCharts, Dataset, Fill, render_charts};
pub use fetch::DashboardClient;
pub use html::render_html;
pub use presign::{Credentials, PresignedUrl, Presigner};

/// Dashboard delivery errors.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Expired or refused presigned URL. Never retried.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Dashboard unavailable: {0}")]
    Unavailable(String),

    #[error("Dashboard data is malformed: {0}")]
    Malformed(String),

    #[error("Presign error: {0}")]
    Presign(#[from] PresignError),
}

/// Errors producing a presigned URL.
#[derive(Debug, Error)]
pub enum PresignError {
    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid expiry: {0} seconds (allowed 1..=604800)")]
    InvalidExpiry(u64),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}
