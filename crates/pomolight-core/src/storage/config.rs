//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Work and break durations
//! - Light driver selection
//! - Recurring daily meetings
//! - Persistence behaviour
//!
//! Configuration is stored at `~/.config/pomolight/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::meeting::TimeOfDay;
use crate::timer::{DEBUG_MINUTE_MS, MINUTE_MS};

/// Timer durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_duration")]
    pub work_duration: u32,
    #[serde(default = "default_break_duration")]
    pub break_duration: u32,
    /// Length of a minute in milliseconds. Lower it to speed runs up.
    #[serde(default = "default_minute_ms")]
    pub minute_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightDriver {
    /// No device; effects are dropped.
    None,
    /// Effects are written to the log.
    Log,
    /// Effects run `light.command`.
    Command,
}

/// Notification light configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    #[serde(default = "default_light_driver")]
    pub driver: LightDriver,
    /// Program used by the `command` driver.
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default = "default_pulse_rate_ms")]
    pub pulse_rate_ms: u64,
}

/// Meeting configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingsConfig {
    /// Daily meetings as `HHMM` strings.
    #[serde(default)]
    pub recurring: Vec<String>,
}

/// State file configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Refuse to start when the state file is corrupt instead of resetting it.
    #[serde(default)]
    pub strict: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pomolight/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default)]
    pub meetings: MeetingsConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

// Default functions
fn default_work_duration() -> u32 {
    25
}
fn default_break_duration() -> u32 {
    5
}
fn default_minute_ms() -> u64 {
    MINUTE_MS as u64
}
fn default_light_driver() -> LightDriver {
    LightDriver::Log
}
fn default_pulse_rate_ms() -> u64 {
    500
}
fn default_debounce_ms() -> u64 {
    200
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_duration: default_work_duration(),
            break_duration: default_break_duration(),
            minute_ms: default_minute_ms(),
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            driver: default_light_driver(),
            command: None,
            pulse_rate_ms: default_pulse_rate_ms(),
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            strict: false,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let unknown = || ConfigError::UnknownKey(key.to_string());

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/pomolight"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing the defaults there when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn update(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.update(key, value)?;
        self.save()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timer.minute_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.minute_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.light.driver == LightDriver::Command && self.light.command.is_none() {
            return Err(ConfigError::InvalidValue {
                key: "light.command".into(),
                message: "required when light.driver is \"command\"".into(),
            });
        }
        for entry in &self.meetings.recurring {
            TimeOfDay::parse(entry).map_err(|e| ConfigError::InvalidValue {
                key: "meetings.recurring".into(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Switch to the accelerated dev-mode timing.
    pub fn with_debug_timing(mut self) -> Self {
        self.timer.minute_ms = DEBUG_MINUTE_MS as u64;
        self.timer.work_duration = 5;
        self
    }

    pub fn minute_ms(&self) -> i64 {
        i64::try_from(self.timer.minute_ms).unwrap_or(MINUTE_MS).max(1)
    }

    /// Recurring meetings that parse; bad entries are logged and skipped.
    pub fn recurring_meetings(&self) -> Vec<TimeOfDay> {
        self.meetings
            .recurring
            .iter()
            .filter_map(|entry| match TimeOfDay::parse(entry) {
                Ok(time) => Some(time),
                Err(e) => {
                    tracing::warn!(entry = %entry, error = %e, "skipping recurring meeting");
                    None
                }
            })
            .collect()
    }
}
