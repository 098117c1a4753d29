mod config;
pub mod state;
pub mod writer;

pub use config::{Config, LightConfig, LightDriver, MeetingsConfig, PersistenceConfig, TimerConfig};
pub use state::PersistedState;
pub use writer::{StateWriter, WriteStatus};

use std::path::PathBuf;

/// Returns `~/.config/pomolight[-dev]/` based on POMOLIGHT_ENV.
///
/// Set POMOLIGHT_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMOLIGHT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomolight-dev")
    } else {
        base_dir.join("pomolight")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Fixed per-user location of the session state file.
pub fn state_path() -> std::io::Result<PathBuf> {
    Ok(data_dir()?.join("state.json"))
}
