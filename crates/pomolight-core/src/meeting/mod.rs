mod input;
mod scheduler;

pub use input::TimeOfDay;
pub use scheduler::{
    MeetingAction, MeetingEvent, MeetingPhase, MeetingScheduler, MeetingSnapshot, MeetingTable,
    MeetingTransition,
};
