use super::traits::Clock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Milliseconds since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the wrap-around.
        self.epoch.elapsed().as_millis() as u32
    }
}

/// Hand-driven clock; clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU32>);

impl ManualClock {
    pub fn new(start_ms: u32) -> Self {
        Self(Arc::new(AtomicU32::new(start_ms)))
    }

    pub fn set(&self, ms: u32) {
        self.0.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u32) {
        let now = self.0.load(Ordering::SeqCst);
        self.0.store(now.wrapping_add(ms), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}
