//! Usage recorder: per-request usage records and after-the-fact
//! reconciliation of completion outcomes.
//!
//! Completion records are written when the request is made, before anyone
//! knows whether the suggestion will be kept. Once the user accepts or
//! rejects it, [`UsageRecorder::reconcile`] fills in the byte count on the
//! user's most recent completion record, exactly once.

pub mod file;
pub mod summary;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::usage::{DashboardSummary, FeatureKind, UsageRecord};

pub use file::FileUsageStore;
pub use summary::summarize;

/// Usage tracking errors.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("No {feature} usage record found for user {user_id}")]
    NotFound {
        user_id: String,
        feature: FeatureKind,
    },

    #[error("Usage record for user {user_id} at {timestamp} is already reconciled")]
    AlreadyReconciled { user_id: String, timestamp: i64 },

    #[error("Usage storage error: {0}")]
    Storage(String),
}

/// Store-assigned identity of a record. Increases with insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub u64);

/// A record together with its store identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub record: UsageRecord,
}

/// Backing table for usage records.
#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn append(&self, record: UsageRecord) -> Result<RecordId, UsageError>;

    /// Most recent record for `(user_id, feature)`: highest timestamp, and
    /// among equal timestamps the one appended last.
    async fn latest(
        &self,
        user_id: &str,
        feature: FeatureKind,
    ) -> Result<Option<StoredRecord>, UsageError>;

    /// Set the outcome of a record. Fails if its bytes are already set.
    async fn set_outcome(&self, id: RecordId, accepted: bool, bytes: u64)
    -> Result<UsageRecord, UsageError>;

    /// All records of one user, in insertion order.
    async fn records_for(&self, user_id: &str) -> Result<Vec<UsageRecord>, UsageError>;
}

/// In-process usage table.
#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    rows: Mutex<Vec<StoredRecord>>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredRecord>>, UsageError> {
        self.rows
            .lock()
            .map_err(|_| UsageError::Storage("usage table lock poisoned".to_string()))
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn append(&self, record: UsageRecord) -> Result<RecordId, UsageError> {
        let mut rows = self.rows()?;
        let id = RecordId(rows.len() as u64);
        rows.push(StoredRecord { id, record });
        Ok(id)
    }

    async fn latest(
        &self,
        user_id: &str,
        feature: FeatureKind,
    ) -> Result<Option<StoredRecord>, UsageError> {
        let rows = self.rows()?;
        Ok(rows
            .iter()
            .filter(|r| r.record.user_id == user_id && r.record.feature == feature)
            .max_by_key(|r| (r.record.timestamp, r.id))
            .cloned())
    }

    async fn set_outcome(
        &self,
        id: RecordId,
        accepted: bool,
        bytes: u64,
    ) -> Result<UsageRecord, UsageError> {
        let mut rows = self.rows()?;
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| UsageError::Storage(format!("no record with id {}", id.0)))?;
        if row.record.bytes.is_some() {
            return Err(UsageError::AlreadyReconciled {
                user_id: row.record.user_id.clone(),
                timestamp: row.record.timestamp,
            });
        }
        row.record.bytes = Some(bytes);
        row.record.accepted = Some(accepted);
        Ok(row.record.clone())
    }

    async fn records_for(&self, user_id: &str) -> Result<Vec<UsageRecord>, UsageError> {
        let rows = self.rows()?;
        Ok(rows
            .iter()
            .filter(|r| r.record.user_id == user_id)
            .map(|r| r.record.clone())
            .collect())
    }
}

/// Records usage events and reconciles completion outcomes.
///
/// Reconciliation is a read-then-write against the store with no lock held
/// in between; two concurrent calls for the same user can race, and the
/// loser gets [`UsageError::AlreadyReconciled`].
#[derive(Clone)]
pub struct UsageRecorder {
    store: Arc<dyn UsageStore>,
}

impl UsageRecorder {
    pub fn new(store: Arc<dyn UsageStore>) -> Self {
        Self { store }
    }

    /// Log one request. Completion records start without a byte count.
    pub async fn record(
        &self,
        user_id: &str,
        feature: FeatureKind,
        language: &str,
        bytes: Option<u64>,
        at: DateTime<Utc>,
    ) -> Result<RecordId, UsageError> {
        let bytes = match feature {
            FeatureKind::CodeCompletion => None,
            _ => bytes,
        };
        let id = self
            .store
            .append(UsageRecord {
                user_id: user_id.to_string(),
                timestamp: at.timestamp(),
                feature,
                code_language: language.to_string(),
                bytes,
                accepted: None,
            })
            .await?;
        debug!(user_id, %feature, language, "usage recorded");
        Ok(id)
    }

    /// Settle the user's most recent completion record: `bytes` when the
    /// suggestion was accepted, zero when it was rejected.
    pub async fn reconcile(
        &self,
        user_id: &str,
        accepted: bool,
        bytes: u64,
    ) -> Result<UsageRecord, UsageError> {
        let latest = self
            .store
            .latest(user_id, FeatureKind::CodeCompletion)
            .await?
            .ok_or_else(|| UsageError::NotFound {
                user_id: user_id.to_string(),
                feature: FeatureKind::CodeCompletion,
            })?;

        let bytes = if accepted { bytes } else { 0 };
        let updated = self.store.set_outcome(latest.id, accepted, bytes).await?;
        info!(
            user_id,
            timestamp = updated.timestamp,
            accepted,
            bytes,
            "completion usage reconciled"
        );
        Ok(updated)
    }

    /// Aggregate a user's records into a dashboard summary.
    pub async fn summary(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary, UsageError> {
        let records = self.store.records_for(user_id).await?;
        Ok(summarize(&records, now))
    }
}
