//! The cooperative driver tying both machines to the clock, the light and
//! the state file.
//!
//! The runtime calls [`App::tick`] once a second and [`App::handle`] for
//! each command the user picks. Each call runs to completion before the
//! next; the only work left in flight is the debounced state write.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;

use crate::clock::Clock;
use crate::error::{CoreError, MeetingInputError, Result};
use crate::events::Event;
use crate::light::{effective_intent, LightController};
use crate::meeting::{MeetingPhase, MeetingScheduler, TimeOfDay};
use crate::reconcile;
use crate::storage::{Config, PersistedState, StateWriter};
use crate::timer::{Progress, SessionEvent, SessionMachine};

/// A command the user can pick from the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Session(SessionEvent),
    ConfigureMeetings,
    FinishMeetingConfig,
    DismissMeeting,
    AddMeeting(String),
    RemoveMeeting(String),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Session(event) => f.write_str(event.token()),
            Command::ConfigureMeetings => f.write_str("meetings"),
            Command::FinishMeetingConfig => f.write_str("done"),
            Command::DismissMeeting => f.write_str("dismiss"),
            Command::AddMeeting(time) => write!(f, "add {time}"),
            Command::RemoveMeeting(time) => write!(f, "remove {time}"),
        }
    }
}

impl FromStr for Command {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || CoreError::UnknownCommand(s.trim().to_string());
        let mut parts = s.split_whitespace();
        let head = parts.next().ok_or_else(unknown)?.to_ascii_lowercase();
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(unknown());
        }

        let command = match (head.as_str(), arg) {
            ("work" | "break" | "stop" | "exit", None) => {
                Command::Session(head.parse().map_err(|_| unknown())?)
            }
            ("meetings", None) => Command::ConfigureMeetings,
            ("done", None) => Command::FinishMeetingConfig,
            ("dismiss", None) => Command::DismissMeeting,
            ("add", Some(time)) => Command::AddMeeting(time.to_string()),
            ("remove", Some(time)) => Command::RemoveMeeting(time.to_string()),
            _ => return Err(unknown()),
        };
        Ok(command)
    }
}

pub struct App {
    session: SessionMachine,
    meetings: MeetingScheduler,
    light: LightController,
    writer: StateWriter,
    clock: Box<dyn Clock>,
}

impl App {
    /// Rehydrate both machines from `persisted` and show the initial light.
    pub fn start(
        config: &Config,
        persisted: &PersistedState,
        light: LightController,
        writer: StateWriter,
        clock: Box<dyn Clock>,
    ) -> Self {
        let (session, meetings) = reconcile::restore(persisted, config, clock.now_ms());
        let mut app = Self {
            session,
            meetings,
            light,
            writer,
            clock,
        };
        app.refresh_light();
        app.persist();
        app
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &SessionMachine {
        &self.session
    }

    pub fn meetings(&self) -> &MeetingScheduler {
        &self.meetings
    }

    pub fn light(&self) -> &LightController {
        &self.light
    }

    pub fn progress(&self) -> Option<Progress> {
        self.session.progress(self.clock.now_ms())
    }

    /// The session reached `exit`.
    pub fn is_finished(&self) -> bool {
        self.session.is_terminal()
    }

    /// Commands that are legal right now, as menu entries.
    pub fn menu(&self) -> Vec<String> {
        let mut entries: Vec<String> = self
            .session
            .legal_events()
            .into_iter()
            .map(|e| Command::Session(e).to_string())
            .collect();
        match self.meetings.phase() {
            MeetingPhase::Idle => entries.push(Command::ConfigureMeetings.to_string()),
            MeetingPhase::ConfigMeetings => {
                entries.push(Command::AddMeeting("HHMM".into()).to_string());
                entries.push(Command::RemoveMeeting("HHMM".into()).to_string());
                entries.push(Command::FinishMeetingConfig.to_string());
            }
            MeetingPhase::Meeting => entries.push(Command::DismissMeeting.to_string()),
        }
        entries
    }

    pub fn snapshot(&self) -> Event {
        Event::snapshot(&self.session, &self.meetings, self.clock.now().with_timezone(&Utc))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply one user command. Illegal commands and rejected meeting input
    /// leave every piece of state untouched.
    pub fn handle(&mut self, command: Command) -> Result<Vec<Event>> {
        let now = self.clock.now();
        let now_ms = now.timestamp_millis();
        let at = now.with_timezone(&Utc);
        let illegal = |app: &Self| CoreError::IllegalCommand {
            command: command.to_string(),
            phase: format!(
                "session is {} and meetings are {}",
                app.session.phase(),
                app.meetings.phase()
            ),
        };

        let event = match &command {
            Command::Session(SessionEvent::Finished) => return Err(illegal(self)),
            Command::Session(event) => {
                let t = self.session.send(*event, now_ms).ok_or_else(|| illegal(self))?;
                self.refresh_light();
                Event::session_changed(&t, at)
            }
            Command::ConfigureMeetings => {
                let t = self.meetings.configure(now_ms).ok_or_else(|| illegal(self))?;
                self.refresh_light();
                Event::meeting_changed(&t, at)
            }
            Command::FinishMeetingConfig | Command::DismissMeeting => {
                let expected = match command {
                    Command::FinishMeetingConfig => MeetingPhase::ConfigMeetings,
                    _ => MeetingPhase::Meeting,
                };
                if self.meetings.phase() != expected {
                    return Err(illegal(self));
                }
                let t = self.meetings.stop(now_ms).ok_or_else(|| illegal(self))?;
                self.refresh_light();
                Event::meeting_changed(&t, at)
            }
            Command::AddMeeting(input) => {
                if self.meetings.phase() != MeetingPhase::ConfigMeetings {
                    return Err(illegal(self));
                }
                let meeting_at_ms = self.meetings.add_meeting(input, &now)?;
                Event::MeetingAdded { meeting_at_ms, at }
            }
            Command::RemoveMeeting(input) => {
                if self.meetings.phase() != MeetingPhase::ConfigMeetings {
                    return Err(illegal(self));
                }
                let time = TimeOfDay::parse(input)?;
                let meeting_at_ms = time
                    .today_ms(&now)
                    .ok_or_else(|| MeetingInputError::InvalidFormat(input.clone()))?;
                let removed = self.meetings.remove_meeting(meeting_at_ms);
                Event::MeetingRemoved {
                    meeting_at_ms,
                    removed,
                    at,
                }
            }
        };

        self.persist();
        Ok(vec![event])
    }

    /// Advance time-driven transitions. Call once per clock tick.
    pub fn tick(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let at = now.with_timezone(&Utc);
        let pending_before = self.meetings.upcoming().len();
        let mut events = Vec::new();

        if let Some(t) = self.session.tick(now.timestamp_millis()) {
            events.push(Event::session_changed(&t, at));
        }
        if let Some(t) = self.meetings.check(&now) {
            tracing::info!("meeting started");
            events.push(Event::meeting_changed(&t, at));
        }

        if !events.is_empty() {
            self.refresh_light();
        }
        if !events.is_empty() || self.meetings.upcoming().len() != pending_before {
            self.persist();
        }
        events
    }

    /// Switch the light off and flush the state file.
    pub async fn shutdown(mut self) {
        self.light.release();
        self.writer.shutdown().await;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn refresh_light(&mut self) {
        let intent = effective_intent(self.session.phase(), self.meetings.phase());
        if intent == self.light.active() && self.light.is_connected() {
            return;
        }
        self.light.show(intent);
    }

    fn persist(&self) {
        self.writer
            .stage(reconcile::snapshot(&self.session, &self.meetings));
    }
}
