use chrono::Local;
use clap::Subcommand;
use pomolight_core::storage::{state, state_path};
use pomolight_core::{Config, MeetingScheduler, TimeOfDay};

use super::clock_of;

#[derive(Subcommand)]
pub enum MeetingAction {
    /// Add a meeting for today
    Add {
        /// Start time as HHMM (e.g. 0930)
        time: String,
    },
    /// Remove today's meeting at a time
    Remove {
        /// Start time as HHMM
        time: String,
    },
    /// List pending and recurring meetings
    List,
}

pub fn run(action: MeetingAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let path = state_path()?;
    let mut saved = super::load_state(&path, config.persistence.strict)?;
    let now = Local::now();
    let mut meetings = MeetingScheduler::restore(
        saved.meeting_phase,
        saved.meetings.clone(),
        config.recurring_meetings(),
        now.timestamp_millis(),
    );

    match action {
        MeetingAction::Add { time } => {
            let at = meetings.add_meeting(&time, &now)?;
            saved.meetings = meetings.upcoming().to_vec();
            state::save(&path, &saved)?;
            println!("meeting added at {}", clock_of(at));
        }
        MeetingAction::Remove { time } => {
            let at = TimeOfDay::parse(&time)?
                .today_ms(&now)
                .ok_or_else(|| format!("{time} does not exist today"))?;
            if meetings.remove_meeting(at) == 0 {
                println!("no meeting at {}", clock_of(at));
                return Ok(());
            }
            saved.meetings = meetings.upcoming().to_vec();
            state::save(&path, &saved)?;
            println!("meeting at {} removed", clock_of(at));
        }
        MeetingAction::List => {
            for at in meetings.upcoming() {
                println!("{}", clock_of(*at));
            }
            for time in meetings.recurring() {
                println!("{:02}:{:02} (daily)", time.hour, time.minute);
            }
        }
    }
    Ok(())
}
