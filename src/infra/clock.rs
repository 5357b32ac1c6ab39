//! Injectable time sources
//!
//! The engine uses two clocks with distinct contracts: a monotonic reading for
//! all interval arithmetic (enter/dwell/lost-tolerance), immune to wall-clock
//! adjustments, and a wall-clock timestamp only for event payloads. Both sit
//! behind the [`Clock`] trait so tests and replays can drive time manually.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Monotonic reading since an arbitrary fixed origin
    fn monotonic(&self) -> Duration;
    /// Wall-clock timestamp for externally visible payloads
    fn wall(&self) -> DateTime<Utc>;
}

/// Real time: `Instant` for intervals, `Utc::now` for payloads
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wall(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and recorded replays
///
/// Wall time is derived from a fixed origin plus the monotonic offset, so
/// payload timestamps stay consistent with the driven intervals.
pub struct ManualClock {
    offset_ms: AtomicU64,
    wall_origin: DateTime<Utc>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(wall_origin: DateTime<Utc>) -> Self {
        Self { offset_ms: AtomicU64::new(0), wall_origin }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, elapsed: Duration) {
        self.offset_ms.store(elapsed.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn monotonic(&self) -> Duration {
        Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }

    fn wall(&self) -> DateTime<Utc> {
        self.wall_origin
            + chrono::Duration::from_std(self.monotonic()).unwrap_or(chrono::Duration::zero())
    }
}
