//! Local file backend
//!
//! State lives in a JSON file (default `dxform.state.json`) and the lock in a
//! sibling `.lock` file. Writes go through a temporary file and a rename so a
//! crash never leaves half a state file behind.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::backend::{BackendConfig, BackendError, BackendResult, StateBackend};
use crate::lock::LockInfo;
use crate::state::StateFile;

/// An empty lock file older than this is left over from a crashed writer
const ABANDONED_LOCK_AGE: Duration = Duration::from_secs(60);

/// What the lock file currently holds
enum LockFile {
    Absent,
    /// Created but its contents not yet written
    Writing { abandoned: bool },
    Held(LockInfo),
}

fn lock_being_written() -> BackendError {
    BackendError::Locked {
        lock_id: "(pending)".to_string(),
        who: "another process".to_string(),
        operation: "acquire lock".to_string(),
    }
}

pub struct LocalBackend {
    state_path: PathBuf,
    lock_path: PathBuf,
}

impl LocalBackend {
    pub const DEFAULT_STATE_FILE: &'static str = "dxform.state.json";

    pub fn new() -> Self {
        Self::with_path(PathBuf::from(Self::DEFAULT_STATE_FILE))
    }

    pub fn with_path(state_path: PathBuf) -> Self {
        let lock_path = state_path.with_extension("lock");
        Self {
            state_path,
            lock_path,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::with_path(PathBuf::from(
            config.path.as_deref().unwrap_or(Self::DEFAULT_STATE_FILE),
        ))
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    async fn read_lock(&self) -> BackendResult<LockFile> {
        let content = match fs::read_to_string(&self.lock_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LockFile::Absent),
            Err(e) => return Err(BackendError::Io(format!("Failed to read lock file: {}", e))),
        };

        if content.trim().is_empty() {
            let age = fs::metadata(&self.lock_path)
                .await
                .ok()
                .and_then(|m| m.modified().ok())
                .and_then(|modified| SystemTime::now().duration_since(modified).ok());
            return Ok(LockFile::Writing {
                abandoned: age.is_some_and(|age| age > ABANDONED_LOCK_AGE),
            });
        }

        serde_json::from_str(&content)
            .map(LockFile::Held)
            .map_err(|e| BackendError::InvalidState(format!("Failed to parse lock file: {}", e)))
    }

    /// The lock held by someone, or `LockNotFound` for `lock_id`
    async fn held_lock(&self, lock_id: &str) -> BackendResult<LockInfo> {
        match self.read_lock().await? {
            LockFile::Held(existing) => Ok(existing),
            LockFile::Writing { .. } => Err(lock_being_written()),
            LockFile::Absent => Err(BackendError::LockNotFound(lock_id.to_string())),
        }
    }

    async fn remove_lock(&self) -> BackendResult<()> {
        fs::remove_file(&self.lock_path)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to remove lock file: {}", e)))
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateBackend for LocalBackend {
    async fn read_state(&self) -> BackendResult<Option<StateFile>> {
        let content = match fs::read_to_string(&self.state_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BackendError::Io(format!("Failed to read state file: {}", e))),
        };

        let state: StateFile = serde_json::from_str(&content)
            .map_err(|e| BackendError::InvalidState(format!("Failed to parse state file: {}", e)))?;
        if state.version > StateFile::CURRENT_VERSION {
            return Err(BackendError::InvalidState(format!(
                "state file version {} is newer than supported version {}",
                state.version,
                StateFile::CURRENT_VERSION
            )));
        }
        Ok(Some(state))
    }

    async fn write_state(&self, state: &StateFile) -> BackendResult<()> {
        if let Some(stored) = self.read_state().await?
            && stored.lineage != state.lineage
        {
            return Err(BackendError::LineageMismatch {
                expected: stored.lineage,
                actual: state.lineage.clone(),
            });
        }

        let content = serde_json::to_string_pretty(state)
            .map_err(|e| BackendError::Serialization(format!("Failed to serialize state: {}", e)))?;

        let tmp_path = self.state_path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write state file: {}", e)))?;
        fs::rename(&tmp_path, &self.state_path)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to replace state file: {}", e)))?;

        log::debug!(
            "wrote state serial {} to {}",
            state.serial,
            self.state_path.display()
        );
        Ok(())
    }

    async fn acquire_lock(&self, operation: &str) -> BackendResult<LockInfo> {
        match self.read_lock().await? {
            LockFile::Absent => {}
            LockFile::Held(existing) => {
                if !existing.is_expired() {
                    return Err(BackendError::locked(&existing));
                }
                log::warn!(
                    "replacing expired lock {} held by {}",
                    existing.id,
                    existing.who
                );
                self.remove_lock().await?;
            }
            LockFile::Writing { abandoned: false } => return Err(lock_being_written()),
            LockFile::Writing { abandoned: true } => {
                log::warn!("replacing abandoned empty lock file {}", self.lock_path.display());
                self.remove_lock().await?;
            }
        }

        let lock = LockInfo::new(operation);
        let content = serde_json::to_string_pretty(&lock)
            .map_err(|e| BackendError::Serialization(format!("Failed to serialize lock: {}", e)))?;

        // create_new so two processes racing for the lock cannot both win
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return match self.read_lock().await? {
                    LockFile::Held(holder) => Err(BackendError::locked(&holder)),
                    LockFile::Writing { .. } => Err(lock_being_written()),
                    LockFile::Absent => {
                        Err(BackendError::Io("lock file appeared and vanished".to_string()))
                    }
                };
            }
            Err(e) => return Err(BackendError::Io(format!("Failed to create lock file: {}", e))),
        };
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write lock file: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write lock file: {}", e)))?;

        Ok(lock)
    }

    async fn release_lock(&self, lock: &LockInfo) -> BackendResult<()> {
        let existing = self.held_lock(&lock.id).await?;
        if existing.id != lock.id {
            return Err(BackendError::LockMismatch {
                expected: lock.id.clone(),
                actual: existing.id,
            });
        }
        self.remove_lock().await
    }

    async fn force_unlock(&self, lock_id: &str) -> BackendResult<()> {
        let existing = self.held_lock(lock_id).await?;
        if existing.id != lock_id {
            return Err(BackendError::LockMismatch {
                expected: lock_id.to_string(),
                actual: existing.id,
            });
        }
        self.remove_lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_local_backend_read_write() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("test.state.json"));

        assert!(backend.read_state().await.unwrap().is_none());

        let mut state = StateFile::new();
        state.increment_serial();
        backend.write_state(&state).await.unwrap();

        let read = backend.read_state().await.unwrap().unwrap();
        assert_eq!(read.serial, 1);
        assert!(!dir.path().join("test.state.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_local_backend_rejects_foreign_lineage() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("test.state.json"));

        backend.write_state(&StateFile::new()).await.unwrap();
        let err = backend.write_state(&StateFile::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::LineageMismatch { .. }));
    }

    #[tokio::test]
    async fn test_local_backend_locking() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("test.state.json"));

        let lock = backend.acquire_lock("apply").await.unwrap();
        assert_eq!(lock.operation, "apply");

        let err = backend.acquire_lock("destroy").await.unwrap_err();
        assert!(matches!(err, BackendError::Locked { .. }));

        let stranger = LockInfo::new("import");
        assert!(matches!(
            backend.release_lock(&stranger).await,
            Err(BackendError::LockMismatch { .. })
        ));

        backend.release_lock(&lock).await.unwrap();
        let lock2 = backend.acquire_lock("destroy").await.unwrap();
        backend.force_unlock(&lock2.id).await.unwrap();
        assert!(matches!(
            backend.release_lock(&lock2).await,
            Err(BackendError::LockNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_local_backend_takes_over_expired_lock() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("test.state.json"));

        let stale = LockInfo::with_timeout("apply", chrono::Duration::seconds(-60));
        std::fs::write(
            dir.path().join("test.state.lock"),
            serde_json::to_string(&stale).unwrap(),
        )
        .unwrap();

        let lock = backend.acquire_lock("apply").await.unwrap();
        assert_ne!(lock.id, stale.id);
    }

    #[tokio::test]
    async fn test_local_backend_empty_lock_file_is_locked() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("test.state.json"));

        // Another process has created the lock file but not yet written it
        std::fs::write(dir.path().join("test.state.lock"), "").unwrap();

        let err = backend.acquire_lock("apply").await.unwrap_err();
        assert!(matches!(err, BackendError::Locked { .. }), "{:?}", err);

        let stranger = LockInfo::new("apply");
        assert!(matches!(
            backend.release_lock(&stranger).await,
            Err(BackendError::Locked { .. })
        ));
    }

    #[tokio::test]
    async fn test_local_backend_takes_over_abandoned_empty_lock() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("test.state.json"));

        let file = std::fs::File::create(dir.path().join("test.state.lock")).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(600))
            .unwrap();
        drop(file);

        let lock = backend.acquire_lock("apply").await.unwrap();
        backend.release_lock(&lock).await.unwrap();
    }

    #[test]
    fn test_local_backend_from_config() {
        let backend = LocalBackend::from_config(&BackendConfig::default());
        assert_eq!(backend.state_path(), Path::new("dxform.state.json"));

        let backend = LocalBackend::from_config(&BackendConfig::local("custom.state.json"));
        assert_eq!(backend.state_path(), Path::new("custom.state.json"));
    }
}
