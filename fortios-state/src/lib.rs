//! FortiOS State Management
//!
//! Persists what the provider knows about managed objects between runs:
//! which manifest resource maps to which device object (its mkey), and the
//! attributes last read back from the device.
//!
//! # Overview
//!
//! - **StateFile**: The state structure containing all managed resources
//! - **StateBackend**: A trait for state storage backends
//! - **LocalBackend**: JSON file on disk (`fortios.state.json`)
//!
//! # Example
//!
//! ```ignore
//! use fortios_state::{create_backend, BackendConfig};
//!
//! let backend = create_backend(&BackendConfig::local("fortios.state.json")).await?;
//! let mut state = backend.read_state().await?.unwrap_or_default();
//!
//! // ... apply changes ...
//!
//! state.increment_serial();
//! backend.write_state(&state).await?;
//! ```

pub mod backend;
pub mod backends;
pub mod state;

// Re-export main types for convenience
pub use backend::{BackendConfig, BackendError, BackendResult, StateBackend};
pub use backends::{LocalBackend, create_backend};
pub use state::{ResourceState, StateFile};
