//! Table-driven state machine driver.
//!
//! A machine is described entirely by data: a transition table
//! (`phase x event -> phase`) plus entry and exit action tables. [`drive`]
//! interprets those tables without touching any effects, so the tables can
//! be unit-tested on their own and the caller decides how to run the
//! returned actions.

use std::fmt::Debug;

pub trait PhaseTable {
    type Phase: Copy + Eq + Debug + 'static;
    type Event: Copy + Eq + Debug + 'static;
    type Action: Copy + Eq + Debug + 'static;

    const TRANSITIONS: &'static [(Self::Phase, Self::Event, Self::Phase)];
    const ON_ENTRY: &'static [(Self::Phase, Self::Action)];
    const ON_EXIT: &'static [(Self::Phase, Self::Action)];
}

/// One accepted transition and the actions to run for it, exit actions of
/// `from` first, then entry actions of `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<P, E, A> {
    pub from: P,
    pub event: E,
    pub to: P,
    pub actions: Vec<A>,
}

/// Look up `event` from `from`. `None` means the event is illegal there.
pub fn drive<T: PhaseTable>(
    from: T::Phase,
    event: T::Event,
) -> Option<Transition<T::Phase, T::Event, T::Action>> {
    let to = target::<T>(from, event)?;
    Some(Transition {
        from,
        event,
        to,
        actions: actions::<T>(from, to),
    })
}

/// Enter `phase` without a source phase, running only its entry actions.
/// Used when rehydrating a machine from a snapshot.
pub fn enter<T: PhaseTable>(phase: T::Phase) -> Vec<T::Action> {
    T::ON_ENTRY
        .iter()
        .filter(|(p, _)| *p == phase)
        .map(|(_, a)| *a)
        .collect()
}

fn target<T: PhaseTable>(from: T::Phase, event: T::Event) -> Option<T::Phase> {
    T::TRANSITIONS
        .iter()
        .find(|(f, e, _)| *f == from && *e == event)
        .map(|(_, _, to)| *to)
}

fn actions<T: PhaseTable>(from: T::Phase, to: T::Phase) -> Vec<T::Action> {
    T::ON_EXIT
        .iter()
        .filter(|(p, _)| *p == from)
        .map(|(_, a)| *a)
        .chain(enter::<T>(to))
        .collect()
}

/// Events with an outgoing transition from `from`, in table order.
pub fn legal_events<T: PhaseTable>(from: T::Phase) -> Vec<T::Event> {
    T::TRANSITIONS
        .iter()
        .filter(|(f, _, _)| *f == from)
        .map(|(_, e, _)| *e)
        .collect()
}

/// A phase with no outgoing transitions.
pub fn is_terminal<T: PhaseTable>(phase: T::Phase) -> bool {
    !T::TRANSITIONS.iter().any(|(f, _, _)| *f == phase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Door {
        Open,
        Closed,
        Gone,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Push {
        Open,
        Close,
        Remove,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Act {
        Creak,
        Slam,
    }

    struct DoorTable;

    impl PhaseTable for DoorTable {
        type Phase = Door;
        type Event = Push;
        type Action = Act;

        const TRANSITIONS: &'static [(Door, Push, Door)] = &[
            (Door::Closed, Push::Open, Door::Open),
            (Door::Open, Push::Close, Door::Closed),
            (Door::Closed, Push::Remove, Door::Gone),
        ];
        const ON_ENTRY: &'static [(Door, Act)] = &[(Door::Closed, Act::Slam)];
        const ON_EXIT: &'static [(Door, Act)] = &[(Door::Closed, Act::Creak)];
    }

    #[test]
    fn drive_collects_exit_then_entry_actions() {
        let t = drive::<DoorTable>(Door::Open, Push::Close).unwrap();
        assert_eq!(t.to, Door::Closed);
        assert_eq!(t.actions, vec![Act::Slam]);

        let t = drive::<DoorTable>(Door::Closed, Push::Open).unwrap();
        assert_eq!(t.actions, vec![Act::Creak]);
    }

    #[test]
    fn unknown_pairs_are_rejected() {
        assert!(drive::<DoorTable>(Door::Open, Push::Open).is_none());
        assert!(drive::<DoorTable>(Door::Gone, Push::Close).is_none());
    }

    #[test]
    fn legal_events_follow_table_order() {
        assert_eq!(
            legal_events::<DoorTable>(Door::Closed),
            vec![Push::Open, Push::Remove]
        );
        assert!(legal_events::<DoorTable>(Door::Gone).is_empty());
        assert!(is_terminal::<DoorTable>(Door::Gone));
        assert!(!is_terminal::<DoorTable>(Door::Open));
    }

    #[test]
    fn enter_runs_entry_actions_only() {
        assert_eq!(enter::<DoorTable>(Door::Closed), vec![Act::Slam]);
        assert!(enter::<DoorTable>(Door::Open).is_empty());
    }
}
