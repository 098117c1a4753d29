//! The interactive loop: a 1 Hz ticker and stdin commands on one task.

use std::error::Error;
use std::io::Write;
use std::time::Duration;

use pomolight_core::storage::{state_path, LightConfig, LightDriver};
use pomolight_core::timer::{format_millis, progress_bar};
use pomolight_core::{
    App, Command, CommandLight, Config, Event, Light, LightController, LogLight, MeetingPhase,
    NullLight, StateWriter, SystemClock,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

const BAR_WIDTH: usize = 20;

pub fn run(debug: bool) -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run_loop(debug));
    // A pending stdin read would otherwise hold the runtime open.
    runtime.shutdown_background();
    result
}

async fn run_loop(debug: bool) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    if debug {
        config = config.with_debug_timing();
    }
    let path = state_path()?;
    let persisted = super::load_state(&path, config.persistence.strict)?;
    let light = LightController::acquire(build_light(&config.light)?, config.light.pulse_rate_ms)?;
    let writer = StateWriter::spawn(path, Duration::from_millis(config.persistence.debounce_ms));
    let mut app = App::start(&config, &persisted, light, writer, Box::new(SystemClock));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    render_menu(&app);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let events = app.tick();
                if events.is_empty() {
                    render_progress(&app);
                } else {
                    report(&events);
                    render_menu(&app);
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        tracing::debug!("stdin closed");
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to read stdin");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>().and_then(|command| app.handle(command)) {
                    Ok(events) => report(&events),
                    Err(e) => println!("\n{e}"),
                }
                if app.is_finished() {
                    break;
                }
                render_menu(&app);
            }
            _ = &mut ctrl_c => {
                println!();
                break;
            }
        }
    }

    app.shutdown().await;
    Ok(())
}

fn build_light(config: &LightConfig) -> Result<Box<dyn Light>, Box<dyn Error>> {
    let light: Box<dyn Light> = match config.driver {
        LightDriver::None => Box::new(NullLight),
        LightDriver::Log => Box::new(LogLight),
        LightDriver::Command => {
            let program = config
                .command
                .clone()
                .ok_or("light.command must be set for the command driver")?;
            Box::new(CommandLight::new(program))
        }
    };
    Ok(light)
}

fn describe(event: &Event) -> Option<String> {
    match event {
        Event::SessionChanged { from, to, .. } => Some(format!("{from} -> {to}")),
        Event::MeetingChanged { to, .. } if *to == MeetingPhase::Meeting => {
            Some("meeting time!".to_string())
        }
        Event::MeetingChanged { from, to, .. } => Some(format!("meetings: {from} -> {to}")),
        Event::MeetingAdded { meeting_at_ms, .. } => {
            Some(format!("meeting added at {}", super::clock_of(*meeting_at_ms)))
        }
        Event::MeetingRemoved {
            meeting_at_ms,
            removed,
            ..
        } => Some(match removed {
            0 => format!("no meeting at {}", super::clock_of(*meeting_at_ms)),
            _ => format!("meeting at {} removed", super::clock_of(*meeting_at_ms)),
        }),
        Event::StateSnapshot { .. } => None,
    }
}

fn report(events: &[Event]) {
    for line in events.iter().filter_map(describe) {
        println!("\n{line}");
    }
}

fn render_menu(app: &App) {
    if app.meetings().phase() == MeetingPhase::ConfigMeetings {
        let pending: Vec<String> = app
            .meetings()
            .upcoming()
            .iter()
            .map(|at| super::clock_of(*at))
            .collect();
        println!(
            "meetings today: {}",
            if pending.is_empty() { "none".to_string() } else { pending.join(", ") }
        );
    }
    println!("[{}] {}", app.session().phase(), app.menu().join(" | "));
}

fn render_progress(app: &App) {
    let Some(progress) = app.progress() else {
        return;
    };
    print!(
        "\r{} {} {}",
        app.session().phase(),
        format_millis(progress.remaining_ms),
        progress_bar(progress.completion_fraction, BAR_WIDTH)
    );
    let _ = std::io::stdout().flush();
}
