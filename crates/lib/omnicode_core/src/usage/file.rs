//! Usage table persisted as a JSON array next to the session file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{RecordId, StoredRecord, UsageError, UsageStore};
use crate::models::usage::{FeatureKind, UsageRecord};

pub const USAGE_FILE_NAME: &str = "usage.json";

/// File-backed [`UsageStore`]. A record's id is its position in the file.
#[derive(Debug)]
pub struct FileUsageStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileUsageStore {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(USAGE_FILE_NAME),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<UsageRecord>, UsageError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage(&self.path, e)),
        };
        serde_json::from_slice(&raw).map_err(|e| storage(&self.path, e))
    }

    fn write(&self, records: &[UsageRecord]) -> Result<(), UsageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| storage(parent, e))?;
        }
        let body = serde_json::to_vec_pretty(records).map_err(|e| storage(&self.path, e))?;
        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).map_err(|e| storage(&tmp, e))?;
        file.write_all(&body).map_err(|e| storage(&tmp, e))?;
        file.sync_all().map_err(|e| storage(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| storage(&self.path, e))
    }

    fn locked<T>(
        &self,
        f: impl FnOnce(&Self) -> Result<T, UsageError>,
    ) -> Result<T, UsageError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| UsageError::Storage("usage file lock poisoned".to_string()))?;
        f(self)
    }
}

fn storage(path: &Path, e: impl std::fmt::Display) -> UsageError {
    UsageError::Storage(format!("{}: {e}", path.display()))
}

#[async_trait]
impl UsageStore for FileUsageStore {
    async fn append(&self, record: UsageRecord) -> Result<RecordId, UsageError> {
        self.locked(|store| {
            let mut records = store.read()?;
            records.push(record);
            store.write(&records)?;
            Ok(RecordId(records.len() as u64 - 1))
        })
    }

    async fn latest(
        &self,
        user_id: &str,
        feature: FeatureKind,
    ) -> Result<Option<StoredRecord>, UsageError> {
        self.locked(|store| {
            Ok(store
                .read()?
                .into_iter()
                .enumerate()
                .filter(|(_, r)| r.user_id == user_id && r.feature == feature)
                .max_by_key(|(i, r)| (r.timestamp, *i))
                .map(|(i, record)| StoredRecord {
                    id: RecordId(i as u64),
                    record,
                }))
        })
    }

    async fn set_outcome(
        &self,
        id: RecordId,
        accepted: bool,
        bytes: u64,
    ) -> Result<UsageRecord, UsageError> {
        self.locked(|store| {
            let mut records = store.read()?;
            let record = usize::try_from(id.0)
                .ok()
                .and_then(|i| records.get_mut(i))
                .ok_or_else(|| UsageError::Storage(format!("no record with id {}", id.0)))?;
            if record.bytes.is_some() {
                return Err(UsageError::AlreadyReconciled {
                    user_id: record.user_id.clone(),
                    timestamp: record.timestamp,
                });
            }
            record.bytes = Some(bytes);
            record.accepted = Some(accepted);
            let updated = record.clone();
            store.write(&records)?;
            Ok(updated)
        })
    }

    async fn records_for(&self, user_id: &str) -> Result<Vec<UsageRecord>, UsageError> {
        self.locked(|store| {
            Ok(store
                .read()?
                .into_iter()
                .filter(|r| r.user_id == user_id)
                .collect())
        })
    }
}
