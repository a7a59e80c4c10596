//! Wall-clock sources for the extrapolation engine.
//!
//! The engine reads the clock exactly once per tick and uses that instant
//! for every entity, so entities processed late in a tick are not skewed
//! relative to early ones.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

/// Source of "now" in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_millis(&self) -> f64;
}

/// Real wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> f64 {
        Utc::now().timestamp_millis() as f64
    }
}

/// Manually driven clock for replay and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis_bits: AtomicU64,
}

impl ManualClock {
    pub fn new(now_millis: f64) -> Self {
        Self {
            millis_bits: AtomicU64::new(now_millis.to_bits()),
        }
    }

    pub fn set(&self, now_millis: f64) {
        self.millis_bits.store(now_millis.to_bits(), Ordering::Relaxed);
    }

    /// Move the clock forward by `millis`.
    pub fn advance(&self, millis: f64) {
        self.set(self.now_millis() + millis);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> f64 {
        f64::from_bits(self.millis_bits.load(Ordering::Relaxed))
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_millis(&self) -> f64 {
        (**self).now_millis()
    }
}
