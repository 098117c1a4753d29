use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::meeting::{MeetingEvent, MeetingPhase, MeetingScheduler, MeetingTransition};
use crate::timer::{SessionEvent, SessionMachine, SessionPhase, SessionTransition};

/// Every state change in the system produces an Event.
/// The front-ends render them; the log records them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionChanged {
        from: SessionPhase,
        to: SessionPhase,
        event: SessionEvent,
        at: DateTime<Utc>,
    },
    MeetingChanged {
        from: MeetingPhase,
        to: MeetingPhase,
        event: MeetingEvent,
        at: DateTime<Utc>,
    },
    MeetingAdded {
        meeting_at_ms: i64,
        at: DateTime<Utc>,
    },
    MeetingRemoved {
        meeting_at_ms: i64,
        removed: usize,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        session_phase: SessionPhase,
        meeting_phase: MeetingPhase,
        remaining_ms: Option<i64>,
        completion_fraction: Option<f64>,
        meetings: Vec<i64>,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn session_changed(t: &SessionTransition, at: DateTime<Utc>) -> Self {
        Event::SessionChanged {
            from: t.from,
            to: t.to,
            event: t.event,
            at,
        }
    }

    pub fn meeting_changed(t: &MeetingTransition, at: DateTime<Utc>) -> Self {
        Event::MeetingChanged {
            from: t.from,
            to: t.to,
            event: t.event,
            at,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(session: &SessionMachine, meetings: &MeetingScheduler, now: DateTime<Utc>) -> Self {
        let progress = session.progress(now.timestamp_millis());
        Event::StateSnapshot {
            session_phase: session.phase(),
            meeting_phase: meetings.phase(),
            remaining_ms: progress.map(|p| p.remaining_ms),
            completion_fraction: progress.map(|p| p.completion_fraction),
            meetings: meetings.upcoming().to_vec(),
            at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::MINUTE_MS;
    use chrono::TimeZone;

    #[test]
    fn snapshot_includes_progress_while_timed() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        let now_ms = now.timestamp_millis();
        let mut session = SessionMachine::new(25, 5, MINUTE_MS);
        session.send(SessionEvent::Work, now_ms - 5 * MINUTE_MS).unwrap();
        let meetings = MeetingScheduler::new(Vec::new(), now_ms);

        match Event::snapshot(&session, &meetings, now) {
            Event::StateSnapshot {
                session_phase,
                remaining_ms,
                completion_fraction,
                ..
            } => {
                assert_eq!(session_phase, SessionPhase::Work);
                assert_eq!(remaining_ms, Some(20 * MINUTE_MS));
                assert!((completion_fraction.unwrap() - 0.8).abs() < 1e-9);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn events_are_tagged_by_type() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        let json = serde_json::to_value(Event::MeetingAdded {
            meeting_at_ms: 5,
            at,
        })
        .unwrap();
        assert_eq!(json["type"], "MeetingAdded");
        assert_eq!(json["meeting_at_ms"], 5);
    }
}
