//! State backend trait and error types

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::lock::LockInfo;
use crate::state::StateFile;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("State is locked by {who} (lock ID: {lock_id}, operation: {operation})")]
    Locked {
        lock_id: String,
        who: String,
        operation: String,
    },

    #[error("Lock not found: {0}")]
    LockNotFound(String),

    #[error("Lock ID mismatch: expected {expected}, got {actual}")]
    LockMismatch { expected: String, actual: String },

    #[error("Unsupported backend type: {0}")]
    UnsupportedBackend(String),

    #[error("Invalid state file: {0}")]
    InvalidState(String),

    /// Refuses to overwrite state that belongs to another project
    #[error("State lineage mismatch: expected {expected}, got {actual}")]
    LineageMismatch { expected: String, actual: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BackendError {
    pub fn locked(lock: &LockInfo) -> Self {
        Self::Locked {
            lock_id: lock.id.clone(),
            who: lock.who.clone(),
            operation: lock.operation.clone(),
        }
    }

    pub fn unsupported_backend(backend_type: impl Into<String>) -> Self {
        Self::UnsupportedBackend(backend_type.into())
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Storage for the state file plus an advisory lock around writes
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// Read the current state, `None` on first use
    async fn read_state(&self) -> BackendResult<Option<StateFile>>;

    /// Persist `state`. Callers bump the serial first.
    async fn write_state(&self, state: &StateFile) -> BackendResult<()>;

    /// Take the lock for `operation`. An unexpired lock held by anyone else
    /// is an error.
    async fn acquire_lock(&self, operation: &str) -> BackendResult<LockInfo>;

    async fn release_lock(&self, lock: &LockInfo) -> BackendResult<()>;

    /// Remove a stuck lock by ID
    async fn force_unlock(&self, lock_id: &str) -> BackendResult<()>;
}

/// `backend` block of the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(rename = "type", default = "BackendConfig::default_type")]
    pub backend_type: String,
    /// Location of the state file for the local backend
    #[serde(default)]
    pub path: Option<String>,
}

impl BackendConfig {
    fn default_type() -> String {
        "local".to_string()
    }

    pub fn local(path: impl Into<String>) -> Self {
        Self {
            backend_type: Self::default_type(),
            path: Some(path.into()),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend_type: Self::default_type(),
            path: None,
        }
    }
}
