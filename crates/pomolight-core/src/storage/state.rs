//! On-disk session state.
//!
//! ```json
//! {
//!   "meetings": [1760605980000],
//!   "sessionPhase": { "phase": "work", "context": { "workDurationMinutes": 25, ... } },
//!   "meetingPhase": { "phase": "idle", "ignoreBefore": 1760601600000 }
//! }
//! ```
//!
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-write leaves the previous state intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::meeting::MeetingSnapshot;
use crate::timer::{SessionContext, SessionPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub context: SessionContext,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            context: SessionContext::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Pending meetings as epoch milliseconds, ascending.
    #[serde(default)]
    pub meetings: Vec<i64>,
    #[serde(default)]
    pub session_phase: SessionSnapshot,
    #[serde(default)]
    pub meeting_phase: MeetingSnapshot,
}

impl PersistedState {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// Read the state file. `Ok(None)` when it does not exist.
///
/// # Errors
///
/// Returns [`PersistenceError::Read`] when the file exists but cannot be
/// read or parsed.
pub fn try_load(path: &Path) -> Result<Option<PersistedState>, PersistenceError> {
    let read_error = |message: String| PersistenceError::Read {
        path: path.to_path_buf(),
        message,
    };
    match std::fs::read_to_string(path) {
        Ok(content) => PersistedState::from_json(&content)
            .map(Some)
            .map_err(|e| read_error(e.to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(read_error(e.to_string())),
    }
}

/// Read the state file, falling back to the default state when it is
/// missing or unreadable. Failures are reported, never fatal.
pub fn load(path: &Path) -> PersistedState {
    match try_load(path) {
        Ok(Some(state)) => state,
        Ok(None) => {
            tracing::debug!(path = %path.display(), "no state file, starting fresh");
            PersistedState::default()
        }
        Err(e) => {
            tracing::warn!(error = %e, "state file unreadable, starting fresh");
            PersistedState::default()
        }
    }
}

/// Write `state` synchronously, replacing the file atomically.
pub fn save(path: &Path, state: &PersistedState) -> Result<(), PersistenceError> {
    let write_error = |message: String| PersistenceError::Write {
        path: path.to_path_buf(),
        message,
    };
    let content = state.to_json().map_err(|e| write_error(e.to_string()))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
    }
    let tmp = temp_path(path);
    std::fs::write(&tmp, content).map_err(|e| write_error(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| write_error(e.to_string()))
}

/// Async variant of [`save`] used by the debounced writer.
pub async fn save_async(path: &Path, state: &PersistedState) -> Result<(), PersistenceError> {
    let write_error = |message: String| PersistenceError::Write {
        path: path.to_path_buf(),
        message,
    };
    let content = state.to_json().map_err(|e| write_error(e.to_string()))?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| write_error(e.to_string()))?;
    }
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, content)
        .await
        .map_err(|e| write_error(e.to_string()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| write_error(e.to_string()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
