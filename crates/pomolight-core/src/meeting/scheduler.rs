//! Meeting scheduler.
//!
//! Runs beside the session machine, never inside it:
//!
//! ```text
//! idle -CONFIGMEETINGS-> configMeetings -STOP-> idle
//! idle -(meeting due)--> meeting -------STOP-> idle   (records watermark)
//! ```
//!
//! The pending list holds absolute epoch-ms timestamps, sorted ascending.
//! Recurring daily meetings live in configuration, not in the list, and are
//! gated by the "ignore before" watermark so a dismissed one does not fire
//! again the same day.

use std::fmt;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::input::TimeOfDay;
use crate::error::MeetingInputError;
use crate::light::{Color, LightIntent};
use crate::machine::{self, PhaseTable, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeetingPhase {
    Idle,
    ConfigMeetings,
    Meeting,
}

impl MeetingPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingPhase::Idle => "idle",
            MeetingPhase::ConfigMeetings => "configMeetings",
            MeetingPhase::Meeting => "meeting",
        }
    }

    /// Light that overrides the session light, if any.
    pub fn light_intent(&self) -> Option<LightIntent> {
        match self {
            MeetingPhase::Meeting => Some(LightIntent::Pulse(Color::Blue)),
            MeetingPhase::Idle | MeetingPhase::ConfigMeetings => None,
        }
    }
}

impl fmt::Display for MeetingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeetingEvent {
    ConfigMeetings,
    /// Raised by [`MeetingScheduler::check`] when a meeting is due.
    Due,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingAction {
    RecordDismissal,
}

pub struct MeetingTable;

impl PhaseTable for MeetingTable {
    type Phase = MeetingPhase;
    type Event = MeetingEvent;
    type Action = MeetingAction;

    const TRANSITIONS: &'static [(MeetingPhase, MeetingEvent, MeetingPhase)] = &[
        (MeetingPhase::Idle, MeetingEvent::ConfigMeetings, MeetingPhase::ConfigMeetings),
        (MeetingPhase::ConfigMeetings, MeetingEvent::Stop, MeetingPhase::Idle),
        (MeetingPhase::Idle, MeetingEvent::Due, MeetingPhase::Meeting),
        (MeetingPhase::Meeting, MeetingEvent::Stop, MeetingPhase::Idle),
    ];

    const ON_ENTRY: &'static [(MeetingPhase, MeetingAction)] = &[];

    const ON_EXIT: &'static [(MeetingPhase, MeetingAction)] =
        &[(MeetingPhase::Meeting, MeetingAction::RecordDismissal)];
}

pub type MeetingTransition = Transition<MeetingPhase, MeetingEvent, MeetingAction>;

/// Persisted part of the scheduler besides the meeting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSnapshot {
    pub phase: MeetingPhase,
    /// Recurring meetings at or before this epoch-ms instant stay silent.
    #[serde(default)]
    pub ignore_before: Option<i64>,
}

impl Default for MeetingSnapshot {
    fn default() -> Self {
        Self {
            phase: MeetingPhase::Idle,
            ignore_before: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MeetingScheduler {
    phase: MeetingPhase,
    meetings: Vec<i64>,
    recurring: Vec<TimeOfDay>,
    ignore_before: i64,
}

impl MeetingScheduler {
    /// An idle scheduler. Recurring meetings earlier than `now_ms` are
    /// treated as already handled.
    pub fn new(recurring: Vec<TimeOfDay>, now_ms: i64) -> Self {
        Self {
            phase: MeetingPhase::Idle,
            meetings: Vec::new(),
            recurring,
            ignore_before: now_ms,
        }
    }

    /// Rebuild from persisted parts. `configMeetings` is not resumed; a
    /// running meeting is.
    pub fn restore(
        snapshot: MeetingSnapshot,
        mut meetings: Vec<i64>,
        recurring: Vec<TimeOfDay>,
        now_ms: i64,
    ) -> Self {
        meetings.sort_unstable();
        let phase = match snapshot.phase {
            MeetingPhase::Meeting => MeetingPhase::Meeting,
            MeetingPhase::Idle | MeetingPhase::ConfigMeetings => MeetingPhase::Idle,
        };
        Self {
            phase,
            meetings,
            recurring,
            ignore_before: snapshot.ignore_before.unwrap_or(now_ms),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> MeetingPhase {
        self.phase
    }

    /// Pending meetings, earliest first.
    pub fn upcoming(&self) -> &[i64] {
        &self.meetings
    }

    pub fn recurring(&self) -> &[TimeOfDay] {
        &self.recurring
    }

    pub fn ignore_before(&self) -> i64 {
        self.ignore_before
    }

    pub fn snapshot(&self) -> MeetingSnapshot {
        MeetingSnapshot {
            phase: self.phase,
            ignore_before: Some(self.ignore_before),
        }
    }

    pub fn legal_events(&self) -> Vec<MeetingEvent> {
        machine::legal_events::<MeetingTable>(self.phase)
            .into_iter()
            .filter(|e| *e != MeetingEvent::Due)
            .collect()
    }

    // ── List mutation ────────────────────────────────────────────────

    /// Add a meeting typed as `HHMM` for today. Returns its timestamp.
    pub fn add_meeting<Tz: TimeZone>(
        &mut self,
        input: &str,
        now: &DateTime<Tz>,
    ) -> Result<i64, MeetingInputError> {
        let time = TimeOfDay::parse(input)?;
        let at = time
            .today_ms(now)
            .ok_or_else(|| MeetingInputError::InvalidFormat(input.to_string()))?;
        if at <= now.timestamp_millis() {
            return Err(MeetingInputError::InThePast {
                hour: time.hour,
                minute: time.minute,
            });
        }
        self.meetings.push(at);
        self.meetings.sort_unstable();
        tracing::info!(at, pending = self.meetings.len(), "meeting added");
        Ok(at)
    }

    /// Remove every entry equal to `at`. Returns how many were removed.
    pub fn remove_meeting(&mut self, at: i64) -> usize {
        let before = self.meetings.len();
        self.meetings.retain(|m| *m != at);
        let removed = before - self.meetings.len();
        if removed > 0 {
            tracing::info!(at, removed, "meeting removed");
        }
        removed
    }

    // ── Phase changes ────────────────────────────────────────────────

    /// Run once per tick. When idle, enters `meeting` if a listed or
    /// recurring meeting came due and drops the elapsed entries. During a
    /// meeting, elapsed entries are dropped without a transition. During
    /// configuration they stay pending until the menu is left.
    pub fn check<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Option<MeetingTransition> {
        let now_ms = now.timestamp_millis();
        let elapsed = self.meetings.partition_point(|m| *m <= now_ms);

        match self.phase {
            MeetingPhase::ConfigMeetings => None,
            MeetingPhase::Meeting => {
                if elapsed > 0 {
                    self.meetings.drain(..elapsed);
                    tracing::debug!(pruned = elapsed, "meetings elapsed during a meeting");
                }
                None
            }
            MeetingPhase::Idle => {
                let recurring_due = self.recurring.iter().any(|r| self.recurring_is_due(r, now));
                if elapsed == 0 && !recurring_due {
                    return None;
                }
                self.meetings.drain(..elapsed);
                self.send(MeetingEvent::Due, now_ms)
            }
        }
    }

    /// Enter meeting configuration.
    pub fn configure(&mut self, now_ms: i64) -> Option<MeetingTransition> {
        self.send(MeetingEvent::ConfigMeetings, now_ms)
    }

    /// Leave configuration or dismiss the running meeting.
    pub fn stop(&mut self, now_ms: i64) -> Option<MeetingTransition> {
        self.send(MeetingEvent::Stop, now_ms)
    }

    pub fn send(&mut self, event: MeetingEvent, now_ms: i64) -> Option<MeetingTransition> {
        let Some(transition) = machine::drive::<MeetingTable>(self.phase, event) else {
            tracing::debug!(phase = %self.phase, ?event, "meeting event rejected");
            return None;
        };
        for action in &transition.actions {
            match action {
                MeetingAction::RecordDismissal => self.ignore_before = now_ms,
            }
        }
        self.phase = transition.to;
        tracing::info!(from = %transition.from, to = %transition.to, ?event, "meeting transition");
        Some(transition)
    }

    fn recurring_is_due<Tz: TimeZone>(&self, time: &TimeOfDay, now: &DateTime<Tz>) -> bool {
        match time.today_ms(now) {
            Some(at) => at <= now.timestamp_millis() && at > self.ignore_before,
            None => false,
        }
    }
}
