//! Local file backend for state storage
//!
//! Stores state in a JSON file (default: fortios.state.json). Writes go to a
//! temporary sibling file that is renamed over the state file.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::backend::{BackendConfig, BackendError, BackendResult, StateBackend};
use crate::state::StateFile;

/// Local file backend
pub struct LocalBackend {
    state_path: PathBuf,
}

impl LocalBackend {
    /// Default state file name
    pub const DEFAULT_STATE_FILE: &'static str = "fortios.state.json";

    /// Create a new LocalBackend with the default path in the current directory
    pub fn new() -> Self {
        Self::with_path(PathBuf::from(Self::DEFAULT_STATE_FILE))
    }

    pub fn with_path(state_path: PathBuf) -> Self {
        Self { state_path }
    }

    /// Create a LocalBackend from configuration
    pub fn from_config(config: &BackendConfig) -> BackendResult<Self> {
        let path = match config.get_string("path") {
            Some("") => return Err(BackendError::configuration("'path' must not be empty")),
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(Self::DEFAULT_STATE_FILE),
        };
        Ok(Self::with_path(path))
    }

    pub fn state_path(&self) -> &PathBuf {
        &self.state_path
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
        if !tokio::fs::try_exists(&self.state_path)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to stat state file: {}", e)))?
        {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.state_path)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to read state file: {}", e)))?;

        let state: StateFile = serde_json::from_str(&content).map_err(|e| {
            BackendError::InvalidState(format!("Failed to parse state file: {}", e))
        })?;

        if state.version > StateFile::CURRENT_VERSION {
            return Err(BackendError::UnsupportedVersion {
                found: state.version,
                supported: StateFile::CURRENT_VERSION,
            });
        }

        log::debug!(
            "read state serial {} from {}",
            state.serial,
            self.state_path.display()
        );
        Ok(Some(state))
    }

    async fn write_state(&self, state: &StateFile) -> BackendResult<()> {
        let content = serde_json::to_string_pretty(state).map_err(|e| {
            BackendError::Serialization(format!("Failed to serialize state: {}", e))
        })?;

        let tmp_path = self.state_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write state file: {}", e)))?;
        tokio::fs::rename(&tmp_path, &self.state_path)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to replace state file: {}", e)))?;

        log::debug!(
            "wrote state serial {} to {}",
            state.serial,
            self.state_path.display()
        );
        Ok(())
    }
}
