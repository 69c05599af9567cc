//! Session store: the persisted token bundle and the caller identity
//! derived from it.
//!
//! The core depends only on [`SessionStore`]; the CLI backs it with a JSON
//! file under the user's data directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::jwt::decode_subject;
use crate::models::session::SessionTokens;

/// File name of the persisted bundle inside the data directory.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Session persistence errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Stored session is unreadable: {0}")]
    Corrupt(String),

    #[error("Refusing to store an incomplete token bundle")]
    Incomplete,
}

/// Persisted-state port for the token bundle.
pub trait SessionStore: Send + Sync {
    /// Load the stored bundle. Incomplete bundles load as `None`.
    fn load(&self) -> Result<Option<SessionTokens>, SessionError>;

    /// Store a bundle, replacing any previous one.
    fn save(&self, tokens: &SessionTokens) -> Result<(), SessionError>;

    /// Remove the stored bundle. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), SessionError>;

    /// Subject of the stored access token, or `None` when there is no usable session.
    fn current_user_id(&self) -> Option<String> {
        let tokens = match self.load() {
            Ok(Some(tokens)) => tokens,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "failed to load session");
                return None;
            }
        };
        match decode_subject(&tokens.access_token) {
            Ok(sub) => Some(sub),
            Err(e) => {
                debug!(error = %e, "stored access token does not decode");
                None
            }
        }
    }
}

/// On-disk shape; every field optional so partial bundles load as absent.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StoredTokens {
    id_token: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl StoredTokens {
    fn into_tokens(self) -> Option<SessionTokens> {
        let tokens = SessionTokens::new(self.id_token?, self.access_token?, self.refresh_token?);
        tokens.is_complete().then_some(tokens)
    }
}

/// JSON-file session store.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store the bundle at `dir/session.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SESSION_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionTokens>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: Option<StoredTokens> = serde_json::from_str(&raw)
            .map_err(|e| SessionError::Corrupt(format!("{}: {e}", self.path.display())))?;
        Ok(stored.and_then(StoredTokens::into_tokens))
    }

    fn save(&self, tokens: &SessionTokens) -> Result<(), SessionError> {
        if !tokens.is_complete() {
            return Err(SessionError::Incomplete);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(tokens)
            .map_err(|e| SessionError::Corrupt(format!("encode: {e}")))?;

        // Write-then-rename so a crash never leaves a half-written bundle.
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            restrict_permissions(&file)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        info!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

/// In-memory session store, for tests and embedding hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    tokens: Mutex<Option<SessionTokens>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: SessionTokens) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionTokens>, SessionError> {
        let guard = self
            .tokens
            .lock()
            .map_err(|_| SessionError::Corrupt("session lock poisoned".to_string()))?;
        Ok(guard.clone().filter(SessionTokens::is_complete))
    }

    fn save(&self, tokens: &SessionTokens) -> Result<(), SessionError> {
        if !tokens.is_complete() {
            return Err(SessionError::Incomplete);
        }
        let mut guard = self
            .tokens
            .lock()
            .map_err(|_| SessionError::Corrupt("session lock poisoned".to_string()))?;
        *guard = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self
            .tokens
            .lock()
            .map_err(|_| SessionError::Corrupt("session lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}
