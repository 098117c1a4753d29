//! Restart tests: a session is driven through `App`, the process "exits"
//! and a fresh `App` is started from the state file it left behind.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use pomolight_core::storage::state;
use pomolight_core::timer::MINUTE_MS;
use pomolight_core::{
    App, Color, Command, Config, Light, LightController, LightError, ManualClock, MeetingPhase,
    NullLight, SessionPhase, StateWriter,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn monday_nine() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 6, 15, 9, 0, 0).single().unwrap()
}

fn start(path: &Path, clock: &ManualClock) -> App {
    let config = Config::default();
    let persisted = state::load(path);
    let light = LightController::acquire(Box::new(NullLight), 500).unwrap();
    let writer = StateWriter::spawn(path.to_path_buf(), Duration::from_millis(10));
    App::start(&config, &persisted, light, writer, Box::new(clock.clone()))
}

fn run(app: &mut App, line: &str) {
    let command: Command = line.parse().unwrap();
    app.handle(command).unwrap();
}

struct DeadLight;

impl Light for DeadLight {
    fn set_solid(&mut self, _color: Color) -> Result<(), LightError> {
        Err(LightError::DeviceDisconnected("no device".into()))
    }

    fn set_pulsing(&mut self, _color: Color, _rate_ms: u64) -> Result<(), LightError> {
        Err(LightError::DeviceDisconnected("no device".into()))
    }

    fn off(&mut self) -> Result<(), LightError> {
        Err(LightError::DeviceDisconnected("no device".into()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn work_resumes_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let clock = ManualClock::at(monday_nine());

    let mut app = start(&path, &clock);
    run(&mut app, "work");
    clock.advance_ms(10 * MINUTE_MS);
    app.tick();
    app.shutdown().await;

    let app = start(&path, &clock);
    assert_eq!(app.session().phase(), SessionPhase::Work);
    assert_eq!(app.progress().unwrap().remaining_ms, 15 * MINUTE_MS);
    app.shutdown().await;
}

#[tokio::test]
async fn interval_that_ran_out_while_stopped_finishes_on_first_tick() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let clock = ManualClock::at(monday_nine());

    let mut app = start(&path, &clock);
    run(&mut app, "break");
    app.shutdown().await;

    clock.advance_ms(30 * MINUTE_MS);
    let mut app = start(&path, &clock);
    assert_eq!(app.session().phase(), SessionPhase::Break);
    assert!(app.progress().unwrap().is_complete());
    app.tick();
    assert_eq!(app.session().phase(), SessionPhase::BreakFinished);
    app.shutdown().await;
}

#[tokio::test]
async fn finished_phases_restart_idle_but_meetings_survive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let clock = ManualClock::at(monday_nine());

    let mut app = start(&path, &clock);
    run(&mut app, "meetings");
    run(&mut app, "add 1100");
    run(&mut app, "add 1000");
    run(&mut app, "work");
    clock.advance_ms(25 * MINUTE_MS);
    app.tick();
    assert_eq!(app.session().phase(), SessionPhase::WorkFinished);
    app.shutdown().await;

    let app = start(&path, &clock);
    assert_eq!(app.session().phase(), SessionPhase::Idle);
    assert_eq!(app.meetings().phase(), MeetingPhase::Idle);
    assert_eq!(app.meetings().upcoming().len(), 2);
    assert!(app.meetings().upcoming().windows(2).all(|w| w[0] < w[1]));
    app.shutdown().await;
}

#[tokio::test]
async fn meeting_that_passed_while_stopped_fires_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let clock = ManualClock::at(monday_nine());

    let mut app = start(&path, &clock);
    run(&mut app, "meetings");
    run(&mut app, "add 0915");
    run(&mut app, "done");
    app.shutdown().await;

    clock.advance_ms(60 * MINUTE_MS);
    let mut app = start(&path, &clock);
    app.tick();
    assert_eq!(app.meetings().phase(), MeetingPhase::Meeting);
    assert!(app.meetings().upcoming().is_empty());
    run(&mut app, "dismiss");
    assert!(app.tick().is_empty());
    assert_eq!(app.meetings().phase(), MeetingPhase::Idle);
    app.shutdown().await;
}

#[tokio::test]
async fn corrupt_state_file_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ not json").unwrap();
    let clock = ManualClock::at(monday_nine());

    assert!(state::try_load(&path).is_err());
    let app = start(&path, &clock);
    assert_eq!(app.session().phase(), SessionPhase::Idle);
    assert!(app.meetings().upcoming().is_empty());
    app.shutdown().await;

    assert!(state::try_load(&path).unwrap().is_some());
}

#[test]
fn unreachable_light_fails_acquire() {
    let err = LightController::acquire(Box::new(DeadLight), 500).err().unwrap();
    assert_eq!(err, LightError::DeviceDisconnected("no device".into()));
}
