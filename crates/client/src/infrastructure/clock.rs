//! Clock implementations and the placeholder id generator.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use coursemart_domain::LocalId;

use crate::ports::outbound::ClockPort;

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hands out timestamp-based ids for optimistic placeholders.
///
/// The sequence number keeps ids unique when the clock does not advance
/// between two calls.
pub struct LocalIdGenerator {
    clock: Arc<dyn ClockPort>,
    seq: AtomicU32,
}

impl LocalIdGenerator {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            clock,
            seq: AtomicU32::new(0),
        }
    }

    pub fn next_id(&self) -> LocalId {
        let millis = self.clock.now().timestamp_millis();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        LocalId::new(millis, seq)
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
