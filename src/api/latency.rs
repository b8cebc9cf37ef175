//! Render pipeline latency: time from the start of a scoreboard request
//! (cache read or backend load) to the finished view.

use std::sync::Mutex;
use std::time::Duration;

use hdrhistogram::Histogram;
use serde::Serialize;

/// Lowest and highest trackable values, in microseconds (1us to 10 minutes).
const MIN_US: u64 = 1;
const MAX_US: u64 = 600_000_000;

#[derive(Debug, Clone, Default, Serialize)]
pub struct LatencySnapshot {
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub sample_count: u64,
}

/// Histogram shared by every handler that builds a scoreboard.
pub struct LatencyStats {
    inner: Mutex<Option<Histogram<u64>>>,
}

impl LatencyStats {
    pub fn new() -> Self {
        // None only if the bounds are invalid; recording is then a no-op.
        let histogram = Histogram::new_with_bounds(MIN_US, MAX_US, 3).ok();
        Self {
            inner: Mutex::new(histogram),
        }
    }

    pub fn record(&self, d: Duration) {
        let us = (d.as_micros().min(u128::from(MAX_US)) as u64).max(MIN_US);
        if let Ok(mut guard) = self.inner.lock() {
            if let Some(h) = guard.as_mut() {
                let _ = h.record(us);
            }
        }
    }

    pub fn snapshot(&self) -> LatencySnapshot {
        let Ok(guard) = self.inner.lock() else {
            return LatencySnapshot::default();
        };
        let Some(h) = guard.as_ref().filter(|h| h.len() > 0) else {
            return LatencySnapshot::default();
        };
        let ms = |q: f64| Some(h.value_at_quantile(q) as f64 / 1000.0);
        LatencySnapshot {
            p50_ms: ms(0.5),
            p95_ms: ms(0.95),
            p99_ms: ms(0.99),
            sample_count: h.len(),
        }
    }
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}
