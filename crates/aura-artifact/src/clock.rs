//! Logical timestamps
//!
//! `createdAt` is an ordering key, not a wall-clock guarantee. The clock is
//! floored by wall-clock milliseconds so that values keep increasing across
//! process restarts, and bumped by one whenever two ticks would collide.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic ordering key assigned at artifact creation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LogicalTimestamp(pub u64);

impl LogicalTimestamp {
    /// Raw value
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Display for LogicalTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strictly increasing timestamp source, shared across batches
#[derive(Debug)]
pub struct LogicalClock {
    last: AtomicU64,
    wall_floor: bool,
}

impl LogicalClock {
    /// Clock floored by wall-clock milliseconds
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
            wall_floor: true,
        }
    }

    /// Purely logical clock whose first tick is `start + 1`
    #[inline]
    #[must_use]
    pub fn manual(start: u64) -> Self {
        Self {
            last: AtomicU64::new(start),
            wall_floor: false,
        }
    }

    /// Next timestamp; strictly greater than every value handed out or observed before
    pub fn tick(&self) -> LogicalTimestamp {
        let floor = if self.wall_floor { wall_millis() } else { 0 };
        let mut prev = self.last.load(Ordering::Acquire);
        loop {
            let next = floor.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return LogicalTimestamp(next),
                Err(actual) => prev = actual,
            }
        }
    }

    /// Make sure later ticks sort after `seen` (e.g. after loading persisted artifacts)
    #[inline]
    pub fn observe(&self, seen: LogicalTimestamp) {
        self.last.fetch_max(seen.0, Ordering::AcqRel);
    }

    /// Last value handed out or observed
    #[inline]
    #[must_use]
    pub fn current(&self) -> LogicalTimestamp {
        LogicalTimestamp(self.last.load(Ordering::Acquire))
    }
}

impl Default for LogicalClock {
    fn default() -> Self {
        Self::new()
    }
}

fn wall_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
