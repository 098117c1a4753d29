//! Wall-clock sources.
//!
//! The runtime polls a [`Clock`] once per tick. Everything downstream works
//! from the absolute reading, never from accumulated deltas.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};

pub trait Clock: Send {
    fn now(&self) -> DateTime<Local>;

    /// Current time as epoch milliseconds.
    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// The host's local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to. Clones share the same reading.
#[derive(Debug, Clone)]
pub struct ManualClock {
    epoch_ms: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(epoch_ms: i64) -> Self {
        Self {
            epoch_ms: Arc::new(AtomicI64::new(epoch_ms)),
        }
    }

    pub fn at(time: DateTime<Local>) -> Self {
        Self::new(time.timestamp_millis())
    }

    pub fn set_ms(&self, epoch_ms: i64) {
        self.epoch_ms.store(epoch_ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.epoch_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        let ms = self.epoch_ms.load(Ordering::SeqCst);
        Local
            .timestamp_millis_opt(ms)
            .single()
            .unwrap_or_else(Local::now)
    }

    fn now_ms(&self) -> i64 {
        self.epoch_ms.load(Ordering::SeqCst)
    }
}
