//! Reconciles the two state machines with the persisted state.
//!
//! Saving takes a [`PersistedState`] snapshot of both machines. Restoring
//! replays the saved phase: an interrupted work or break interval is resumed
//! with its original start time, anything else starts over at idle.

use crate::meeting::MeetingScheduler;
use crate::storage::state::{PersistedState, SessionSnapshot};
use crate::storage::Config;
use crate::timer::{SessionMachine, SessionPhase};

pub fn snapshot(session: &SessionMachine, meetings: &MeetingScheduler) -> PersistedState {
    PersistedState {
        meetings: meetings.upcoming().to_vec(),
        session_phase: SessionSnapshot {
            phase: session.phase(),
            context: *session.context(),
        },
        meeting_phase: meetings.snapshot(),
    }
}

pub fn restore_session(state: &PersistedState, config: &Config, now_ms: i64) -> SessionMachine {
    let saved = state.session_phase;
    match (saved.phase, saved.context.start_time) {
        (SessionPhase::Work | SessionPhase::Break, Some(_)) => {
            tracing::info!(
                phase = %saved.phase,
                start_time = ?saved.context.start_time,
                "resuming interrupted session"
            );
            SessionMachine::resume(saved.phase, saved.context, config.minute_ms(), now_ms)
        }
        (phase, _) => {
            if phase != SessionPhase::Idle {
                tracing::debug!(%phase, "saved session phase discarded");
            }
            SessionMachine::new(
                config.timer.work_duration,
                config.timer.break_duration,
                config.minute_ms(),
            )
        }
    }
}

pub fn restore_meetings(state: &PersistedState, config: &Config, now_ms: i64) -> MeetingScheduler {
    MeetingScheduler::restore(
        state.meeting_phase,
        state.meetings.clone(),
        config.recurring_meetings(),
        now_ms,
    )
}

/// Rebuild both machines from `state`.
pub fn restore(
    state: &PersistedState,
    config: &Config,
    now_ms: i64,
) -> (SessionMachine, MeetingScheduler) {
    (
        restore_session(state, config, now_ms),
        restore_meetings(state, config, now_ms),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::{MeetingPhase, MeetingSnapshot};
    use crate::timer::{SessionContext, SessionEvent, MINUTE_MS};

    const NOW: i64 = 1_760_600_000_000;

    fn saved(phase: SessionPhase, start_time: Option<i64>) -> PersistedState {
        PersistedState {
            session_phase: SessionSnapshot {
                phase,
                context: SessionContext {
                    work_duration_minutes: 25,
                    break_duration_minutes: 5,
                    start_time,
                },
            },
            ..PersistedState::default()
        }
    }

    #[test]
    fn interrupted_work_resumes_with_remaining_time() {
        let state = saved(SessionPhase::Work, Some(NOW - 10 * MINUTE_MS));
        let (session, _) = restore(&state, &Config::default(), NOW);
        assert_eq!(session.phase(), SessionPhase::Work);
        let progress = session.progress(NOW).unwrap();
        assert_eq!(progress.remaining_ms, 15 * MINUTE_MS);
    }

    #[test]
    fn interrupted_break_resumes() {
        let state = saved(SessionPhase::Break, Some(NOW - MINUTE_MS));
        let session = restore_session(&state, &Config::default(), NOW);
        assert_eq!(session.phase(), SessionPhase::Break);
        assert_eq!(session.progress(NOW).unwrap().remaining_ms, 4 * MINUTE_MS);
    }

    #[test]
    fn other_phases_restart_idle_with_configured_durations() {
        let mut config = Config::default();
        config.timer.work_duration = 50;
        for phase in [
            SessionPhase::WorkFinished,
            SessionPhase::BreakFinished,
            SessionPhase::ConfigMeetings,
            SessionPhase::Exit,
            SessionPhase::Idle,
        ] {
            let session = restore_session(&saved(phase, None), &config, NOW);
            assert_eq!(session.phase(), SessionPhase::Idle);
            assert_eq!(session.context().work_duration_minutes, 50);
            assert_eq!(session.context().start_time, None);
        }
    }

    #[test]
    fn work_without_start_time_is_not_resumed() {
        let session = restore_session(&saved(SessionPhase::Work, None), &Config::default(), NOW);
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[test]
    fn snapshot_then_restore_round_trips() {
        let config = Config::default();
        let mut session = SessionMachine::new(25, 5, MINUTE_MS);
        session.send(SessionEvent::Work, NOW - 1_000).unwrap();
        let mut meetings = MeetingScheduler::restore(
            MeetingSnapshot {
                phase: MeetingPhase::Idle,
                ignore_before: Some(NOW - 5_000),
            },
            vec![NOW + 60_000, NOW + 30_000],
            Vec::new(),
            NOW,
        );
        meetings.remove_meeting(NOW + 60_000);

        let state = snapshot(&session, &meetings);
        assert_eq!(state.meetings, vec![NOW + 30_000]);

        let (session2, meetings2) = restore(&state, &config, NOW);
        assert_eq!(snapshot(&session2, &meetings2), state);
    }
}
