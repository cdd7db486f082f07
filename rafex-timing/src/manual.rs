use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::timer::{FrameTimingStats, Timer};

/// A clock that only moves when told to. Clones share the same time, so a
/// test can hold one copy and advance the copy owned by the code under test.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
    frame_times: Vec<Duration>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns.fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn set(&self, ns: u64) {
        self.now_ns.store(ns, Ordering::SeqCst);
    }
}

impl Timer for ManualTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn record_frame(&mut self, d: Duration) {
        self.frame_times.push(d);
    }
    fn frame_stats(&self) -> FrameTimingStats {
        FrameTimingStats::from_samples(&self.frame_times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_clock() {
        let a = ManualTimer::new();
        let b = a.clone();
        a.advance_ms(250);
        assert_eq!(b.now(), 250_000_000);
        b.advance(Duration::from_millis(1));
        assert_eq!(a.elapsed(0), Duration::from_millis(251));
        a.set(5);
        assert_eq!(b.now(), 5);
    }
}
