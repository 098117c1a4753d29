//! Duration/progress projection.
//!
//! Progress is recomputed from the absolute start time on every call, so
//! calling it once a second for hours accumulates no error.

use serde::{Deserialize, Serialize};

use super::session::{SessionContext, SessionPhase};

/// Length of one configured minute in milliseconds.
pub const MINUTE_MS: i64 = 60_000;

/// Accelerated minute used by `run --debug`.
pub const DEBUG_MINUTE_MS: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Milliseconds left in the interval. Negative once overdue.
    pub remaining_ms: i64,
    /// Share of the interval still to go, from 1.0 at the start down to 0.0.
    pub completion_fraction: f64,
}

impl Progress {
    /// The interval has run out and FINISHED is due.
    pub fn is_complete(&self) -> bool {
        self.completion_fraction <= 0.0
    }
}

/// Project progress for `phase` at `now_ms`.
///
/// Returns `None` outside work/break, and when no start time is recorded.
pub fn compute_progress(
    phase: SessionPhase,
    context: &SessionContext,
    now_ms: i64,
    minute_ms: i64,
) -> Option<Progress> {
    let duration_min = match phase {
        SessionPhase::Work => context.work_duration_minutes,
        SessionPhase::Break => context.break_duration_minutes,
        _ => return None,
    };
    let start = context.start_time?;

    let duration_ms = i64::from(duration_min).saturating_mul(minute_ms);
    let elapsed = now_ms.saturating_sub(start);
    let remaining_ms = duration_ms.saturating_sub(elapsed);

    let completion_fraction = if duration_ms <= 0 {
        0.0
    } else {
        (1.0 - elapsed as f64 / duration_ms as f64).clamp(0.0, 1.0)
    };

    Some(Progress {
        remaining_ms,
        completion_fraction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ctx(work: u32, brk: u32, start: Option<i64>) -> SessionContext {
        SessionContext {
            work_duration_minutes: work,
            break_duration_minutes: brk,
            start_time: start,
        }
    }

    #[test]
    fn no_progress_outside_timed_phases() {
        let c = ctx(25, 5, Some(0));
        for phase in [
            SessionPhase::Idle,
            SessionPhase::WorkFinished,
            SessionPhase::BreakFinished,
            SessionPhase::ConfigMeetings,
            SessionPhase::Exit,
        ] {
            assert!(compute_progress(phase, &c, 1_000, MINUTE_MS).is_none());
        }
    }

    #[test]
    fn missing_start_time_means_no_progress() {
        let c = ctx(25, 5, None);
        assert!(compute_progress(SessionPhase::Work, &c, 1_000, MINUTE_MS).is_none());
    }

    #[test]
    fn work_uses_work_duration() {
        let c = ctx(25, 5, Some(0));
        let p = compute_progress(SessionPhase::Work, &c, 10 * MINUTE_MS, MINUTE_MS).unwrap();
        assert_eq!(p.remaining_ms, 15 * MINUTE_MS);
        assert!((p.completion_fraction - 0.6).abs() < 1e-9);
        assert!(!p.is_complete());
    }

    #[test]
    fn break_uses_break_duration() {
        let c = ctx(25, 5, Some(0));
        let p = compute_progress(SessionPhase::Break, &c, 5 * MINUTE_MS, MINUTE_MS).unwrap();
        assert_eq!(p.remaining_ms, 0);
        assert!(p.is_complete());
    }

    #[test]
    fn overdue_fraction_clamps_at_zero() {
        let c = ctx(1, 1, Some(0));
        let p = compute_progress(SessionPhase::Work, &c, 3 * MINUTE_MS, MINUTE_MS).unwrap();
        assert_eq!(p.remaining_ms, -2 * MINUTE_MS);
        assert_eq!(p.completion_fraction, 0.0);
    }

    #[test]
    fn debug_minute_shortens_interval() {
        let c = ctx(5, 5, Some(0));
        let p = compute_progress(SessionPhase::Work, &c, 5_000, DEBUG_MINUTE_MS).unwrap();
        assert!(p.is_complete());
    }

    #[test]
    fn zero_duration_is_complete_immediately() {
        let c = ctx(0, 0, Some(100));
        let p = compute_progress(SessionPhase::Work, &c, 100, MINUTE_MS).unwrap();
        assert!(p.is_complete());
    }

    proptest! {
        #[test]
        fn fraction_stays_in_unit_range(
            work in 0u32..240,
            start in 0i64..10_000_000_000,
            offset in -100_000_000i64..100_000_000,
        ) {
            let c = ctx(work, 5, Some(start));
            let p = compute_progress(SessionPhase::Work, &c, start + offset, MINUTE_MS).unwrap();
            prop_assert!((0.0..=1.0).contains(&p.completion_fraction));
        }

        #[test]
        fn remaining_decreases_as_time_moves(
            brk in 1u32..120,
            start in 0i64..10_000_000_000,
            a in 0i64..10_000_000,
            step in 1i64..10_000_000,
        ) {
            let c = ctx(25, brk, Some(start));
            let earlier = compute_progress(SessionPhase::Break, &c, start + a, MINUTE_MS).unwrap();
            let later = compute_progress(SessionPhase::Break, &c, start + a + step, MINUTE_MS).unwrap();
            prop_assert!(later.remaining_ms < earlier.remaining_ms);
            prop_assert!(later.completion_fraction <= earlier.completion_fraction);
        }
    }
}
