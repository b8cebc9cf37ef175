//! Shared health state for the /health endpoint.
//! Updated by the read path (loads) and the submission routes (appends).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Shared health counters. Written by request handlers, read by /health.
#[derive(Default)]
pub struct HealthState {
    /// False after the most recent backend read failed.
    pub last_load_ok: AtomicBool,
    /// Record count of the most recent successful backend read.
    pub records_loaded: AtomicU64,
    pub appends_total: AtomicU64,
    pub append_failures: AtomicU64,
    /// Unix seconds of the last accepted append (0 = none).
    pub last_append_at_secs: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            last_load_ok: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn record_load(&self, ok: bool, records: usize) {
        self.last_load_ok.store(ok, Ordering::Relaxed);
        if ok {
            self.records_loaded.store(records as u64, Ordering::Relaxed);
        }
    }

    pub fn record_append(&self) {
        self.appends_total.fetch_add(1, Ordering::Relaxed);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.last_append_at_secs.store(now, Ordering::Relaxed);
    }

    pub fn record_append_failure(&self) {
        self.append_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_load_ok(&self) -> bool {
        self.last_load_ok.load(Ordering::Relaxed)
    }

    pub fn records_loaded(&self) -> u64 {
        self.records_loaded.load(Ordering::Relaxed)
    }

    pub fn appends_total(&self) -> u64 {
        self.appends_total.load(Ordering::Relaxed)
    }

    pub fn append_failures(&self) -> u64 {
        self.append_failures.load(Ordering::Relaxed)
    }

    pub fn last_append_at_secs(&self) -> u64 {
        self.last_append_at_secs.load(Ordering::Relaxed)
    }
}
