//! Session state machine.
//!
//! ```text
//! idle -> work -> workFinished -> break -> breakFinished -> work ...
//!   \-> break                                   (STOP -> idle from any of them)
//!   \-> exit
//! ```
//!
//! Phases change on user commands and on the internal FINISHED signal,
//! which [`SessionMachine::tick`] raises once the active interval runs out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::progress::{compute_progress, Progress};
use crate::light::{Color, LightIntent};
use crate::machine::{self, PhaseTable, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Idle,
    Work,
    WorkFinished,
    Break,
    BreakFinished,
    /// Only found in older state files; never entered by the table.
    ConfigMeetings,
    Exit,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Work => "work",
            SessionPhase::WorkFinished => "workFinished",
            SessionPhase::Break => "break",
            SessionPhase::BreakFinished => "breakFinished",
            SessionPhase::ConfigMeetings => "configMeetings",
            SessionPhase::Exit => "exit",
        }
    }

    /// Phases that run a countdown and carry a start time.
    pub fn is_timed(&self) -> bool {
        matches!(self, SessionPhase::Work | SessionPhase::Break)
    }

    pub fn light_intent(&self) -> Option<LightIntent> {
        SESSION_LIGHTS
            .iter()
            .find(|(phase, _)| phase == self)
            .map(|(_, intent)| *intent)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Light shown for each session phase when no meeting overrides it.
const SESSION_LIGHTS: &[(SessionPhase, LightIntent)] = &[
    (SessionPhase::Idle, LightIntent::Pulse(Color::Amber)),
    (SessionPhase::Work, LightIntent::Solid(Color::Red)),
    (SessionPhase::WorkFinished, LightIntent::Pulse(Color::Red)),
    (SessionPhase::Break, LightIntent::Solid(Color::Green)),
    (SessionPhase::BreakFinished, LightIntent::Pulse(Color::Green)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionEvent {
    Work,
    Break,
    /// Raised internally when the interval runs out.
    Finished,
    Stop,
    Exit,
}

impl SessionEvent {
    /// The command token a user types for this event.
    pub fn token(&self) -> &'static str {
        match self {
            SessionEvent::Work => "work",
            SessionEvent::Break => "break",
            SessionEvent::Finished => "finished",
            SessionEvent::Stop => "stop",
            SessionEvent::Exit => "exit",
        }
    }
}

impl FromStr for SessionEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(SessionEvent::Work),
            "break" => Ok(SessionEvent::Break),
            "stop" => Ok(SessionEvent::Stop),
            "exit" => Ok(SessionEvent::Exit),
            other => Err(format!("unknown session command: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Record the start time unless one is already set.
    StampStart,
    ClearStart,
}

pub struct SessionTable;

impl PhaseTable for SessionTable {
    type Phase = SessionPhase;
    type Event = SessionEvent;
    type Action = SessionAction;

    const TRANSITIONS: &'static [(SessionPhase, SessionEvent, SessionPhase)] = &[
        (SessionPhase::Idle, SessionEvent::Work, SessionPhase::Work),
        (SessionPhase::Idle, SessionEvent::Break, SessionPhase::Break),
        (SessionPhase::Idle, SessionEvent::Exit, SessionPhase::Exit),
        (SessionPhase::Work, SessionEvent::Finished, SessionPhase::WorkFinished),
        (SessionPhase::Work, SessionEvent::Stop, SessionPhase::Idle),
        (SessionPhase::WorkFinished, SessionEvent::Break, SessionPhase::Break),
        (SessionPhase::WorkFinished, SessionEvent::Stop, SessionPhase::Idle),
        (SessionPhase::Break, SessionEvent::Finished, SessionPhase::BreakFinished),
        (SessionPhase::Break, SessionEvent::Stop, SessionPhase::Idle),
        (SessionPhase::BreakFinished, SessionEvent::Work, SessionPhase::Work),
        (SessionPhase::BreakFinished, SessionEvent::Stop, SessionPhase::Idle),
    ];

    const ON_ENTRY: &'static [(SessionPhase, SessionAction)] = &[
        (SessionPhase::Work, SessionAction::StampStart),
        (SessionPhase::Break, SessionAction::StampStart),
    ];

    const ON_EXIT: &'static [(SessionPhase, SessionAction)] = &[
        (SessionPhase::Work, SessionAction::ClearStart),
        (SessionPhase::Break, SessionAction::ClearStart),
    ];
}

pub type SessionTransition = Transition<SessionPhase, SessionEvent, SessionAction>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub work_duration_minutes: u32,
    pub break_duration_minutes: u32,
    /// Epoch milliseconds. Only set while in work or break.
    #[serde(default)]
    pub start_time: Option<i64>,
}

impl SessionContext {
    pub fn new(work_duration_minutes: u32, break_duration_minutes: u32) -> Self {
        Self {
            work_duration_minutes,
            break_duration_minutes,
            start_time: None,
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(25, 5)
    }
}

#[derive(Debug, Clone)]
pub struct SessionMachine {
    phase: SessionPhase,
    context: SessionContext,
    minute_ms: i64,
}

impl SessionMachine {
    /// A fresh machine in `idle`.
    pub fn new(work_duration_minutes: u32, break_duration_minutes: u32, minute_ms: i64) -> Self {
        Self {
            phase: SessionPhase::Idle,
            context: SessionContext::new(work_duration_minutes, break_duration_minutes),
            minute_ms,
        }
    }

    /// Drive the machine straight into `phase`, keeping any start time already
    /// in `context` so elapsed progress survives a restart.
    pub fn resume(phase: SessionPhase, context: SessionContext, minute_ms: i64, now_ms: i64) -> Self {
        let mut machine = Self {
            phase,
            context,
            minute_ms,
        };
        if !phase.is_timed() {
            machine.context.start_time = None;
        }
        for action in machine::enter::<SessionTable>(phase) {
            machine.apply(action, now_ms);
        }
        machine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn minute_ms(&self) -> i64 {
        self.minute_ms
    }

    pub fn progress(&self, now_ms: i64) -> Option<Progress> {
        compute_progress(self.phase, &self.context, now_ms, self.minute_ms)
    }

    /// Commands the user may send from the current phase.
    pub fn legal_events(&self) -> Vec<SessionEvent> {
        machine::legal_events::<SessionTable>(self.phase)
            .into_iter()
            .filter(|e| *e != SessionEvent::Finished)
            .collect()
    }

    pub fn is_terminal(&self) -> bool {
        machine::is_terminal::<SessionTable>(self.phase)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply `event`. Illegal events leave the machine untouched and return `None`.
    pub fn send(&mut self, event: SessionEvent, now_ms: i64) -> Option<SessionTransition> {
        let Some(transition) = machine::drive::<SessionTable>(self.phase, event) else {
            tracing::debug!(phase = %self.phase, ?event, "session event rejected");
            return None;
        };
        for action in &transition.actions {
            self.apply(*action, now_ms);
        }
        self.phase = transition.to;
        tracing::info!(
            from = %transition.from,
            to = %transition.to,
            ?event,
            start_time = ?self.context.start_time,
            "session transition"
        );
        Some(transition)
    }

    /// Call once per clock tick. Raises FINISHED when the interval has run
    /// out; after the transition the phase is no longer timed, so it fires
    /// only once.
    pub fn tick(&mut self, now_ms: i64) -> Option<SessionTransition> {
        match self.progress(now_ms) {
            Some(progress) if progress.is_complete() => self.send(SessionEvent::Finished, now_ms),
            _ => None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply(&mut self, action: SessionAction, now_ms: i64) {
        match action {
            SessionAction::StampStart => {
                if self.context.start_time.is_none() {
                    self.context.start_time = Some(now_ms);
                }
            }
            SessionAction::ClearStart => self.context.start_time = None,
        }
    }
}
