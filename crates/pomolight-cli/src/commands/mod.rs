pub mod config;
pub mod meeting;
pub mod run;
pub mod status;

use std::path::Path;

use chrono::{Local, TimeZone};
use pomolight_core::storage::state;
use pomolight_core::timer::format_clock;
use pomolight_core::{PersistedState, PersistenceError};

/// Read the state file. In strict mode an unreadable file is an error;
/// otherwise it falls back to a fresh state.
fn load_state(path: &Path, strict: bool) -> Result<PersistedState, PersistenceError> {
    if strict {
        Ok(state::try_load(path)?.unwrap_or_default())
    } else {
        Ok(state::load(path))
    }
}

/// Local `HH:MM` for an epoch-ms timestamp.
fn clock_of(epoch_ms: i64) -> String {
    match Local.timestamp_millis_opt(epoch_ms).single() {
        Some(time) => format_clock(&time),
        None => epoch_ms.to_string(),
    }
}
