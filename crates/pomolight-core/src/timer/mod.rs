mod format;
mod progress;
mod session;

pub use format::{format_clock, format_millis, progress_bar};
pub use progress::{compute_progress, Progress, DEBUG_MINUTE_MS, MINUTE_MS};
pub use session::{
    SessionAction, SessionContext, SessionEvent, SessionMachine, SessionPhase, SessionTable,
    SessionTransition,
};
