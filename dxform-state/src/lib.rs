//! dxform state management
//!
//! Keeps the record of which Direct Connect objects dxform manages: their
//! binding names, AWS identifiers and last known attributes. Mutating commands
//! hold a lock on the backend while they run.
//!
//! ```ignore
//! use dxform_state::{BackendConfig, create_backend};
//!
//! let backend = create_backend(&BackendConfig::local("dxform.state.json"))?;
//! let lock = backend.acquire_lock("apply").await?;
//! let mut state = backend.read_state().await?.unwrap_or_default();
//! // ... apply ...
//! state.increment_serial();
//! backend.write_state(&state).await?;
//! backend.release_lock(&lock).await?;
//! ```

pub mod backend;
pub mod backends;
pub mod lock;
pub mod state;

pub use backend::{BackendConfig, BackendError, BackendResult, StateBackend};
pub use backends::{LocalBackend, create_backend};
pub use lock::LockInfo;
pub use state::{ResourceState, StateFile};
