//! # Pomolight Core Library
//!
//! This library provides the core logic for the pomolight pomodoro timer
//! with its busy-light. The `pomolight` CLI is a thin terminal front-end
//! over the same library.
//!
//! ## Architecture
//!
//! - **Session machine**: work/break intervals driven by user commands and
//!   by the clock. Progress is derived from absolute timestamps, so nothing
//!   is lost while the process is asleep or restarting.
//! - **Meeting scheduler**: a second machine running alongside the session
//!   that lights up when a listed or recurring meeting comes due.
//! - **Light**: maps the combined phase to one light effect and owns the
//!   device.
//! - **Storage**: a JSON state file written through a debounced background
//!   writer, and TOML-based configuration.
//!
//! ## Key Components
//!
//! - [`App`]: Cooperative driver tying everything together
//! - [`SessionMachine`]: Pomodoro state machine
//! - [`MeetingScheduler`]: Meeting list and meeting state machine
//! - [`LightController`]: Light device ownership
//! - [`Config`]: Application configuration management

pub mod app;
pub mod clock;
pub mod error;
pub mod events;
pub mod light;
pub mod machine;
pub mod meeting;
pub mod reconcile;
pub mod storage;
pub mod timer;

pub use app::{App, Command};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, LightError, MeetingInputError, PersistenceError};
pub use events::Event;
pub use light::{effective_intent, Color, CommandLight, Light, LightController, LightIntent, LogLight, NullLight};
pub use meeting::{MeetingEvent, MeetingPhase, MeetingScheduler, TimeOfDay};
pub use storage::{Config, PersistedState, StateWriter, WriteStatus};
pub use timer::{Progress, SessionContext, SessionEvent, SessionMachine, SessionPhase};
