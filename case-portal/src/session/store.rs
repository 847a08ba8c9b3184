use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::api::UserProfile;

/// Persisted session document. `user` holds the serialized profile exactly as
/// it was written, so a damaged snapshot is detected when it is read back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl StoredSession {
    pub fn new(token: &str, user: &UserProfile) -> Result<Self, StoreError> {
        Ok(Self {
            token: Some(token.to_string()),
            user: Some(serde_json::to_string(user)?),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }

    /// Cached profile, if present and readable.
    pub fn cached_user(&self) -> Option<UserProfile> {
        let raw = self.user.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Cached user snapshot is unreadable");
                None
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session document is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Where the session document lives. `save` replaces both keys at once.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<StoredSession, StoreError>;
    async fn save(&self, session: &StoredSession) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

/// In-process store for tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<StoredSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(session: StoredSession) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    pub async fn snapshot(&self) -> StoredSession {
        self.session.lock().await.clone()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<StoredSession, StoreError> {
        Ok(self.session.lock().await.clone())
    }

    async fn save(&self, session: &StoredSession) -> Result<(), StoreError> {
        *self.session.lock().await = session.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.session.lock().await = StoredSession::default();
        Ok(())
    }
}

/// JSON file store. Each write goes to a uniquely named temp file in the
/// target's directory that is then renamed over the target, so readers see
/// either the old or the new document.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

fn write_atomically(dir: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<StoredSession, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, session: &StoredSession) -> Result<(), StoreError> {
        if session.is_empty() {
            return self.clear().await;
        }

        let dir = self.dir();
        tokio::fs::create_dir_all(&dir).await?;

        let contents = serde_json::to_vec_pretty(session)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &path, &contents))
            .await
            .map_err(std::io::Error::other)??;

        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
