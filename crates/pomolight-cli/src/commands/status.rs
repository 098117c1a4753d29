use chrono::Utc;
use pomolight_core::reconcile;
use pomolight_core::storage::state_path;
use pomolight_core::{Config, Event};

/// Print the phases and progress `run` would resume with.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let saved = super::load_state(&state_path()?, config.persistence.strict)?;
    let now = Utc::now();

    let (session, meetings) = reconcile::restore(&saved, &config, now.timestamp_millis());

    let snapshot = Event::snapshot(&session, &meetings, now);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
