//! In-memory record store with failure injection, for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{AppError, Result};
use crate::store::RecordStore;
use crate::types::{SaleCategory, SaleRecord};

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<SaleRecord>>,
    fail_loads: AtomicBool,
    fail_appends: AtomicBool,
    loads: AtomicUsize,
    load_delay: Mutex<Duration>,
}

impl MemoryStore {
    pub fn with_records(records: Vec<SaleRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Add a record behind the cache's back.
    pub fn push(&self, record: SaleRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn records(&self) -> Vec<SaleRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::Relaxed);
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::Relaxed);
    }

    /// Make `load_all` take a snapshot up front, then wait `delay` before returning it.
    pub fn set_load_delay(&self, delay: Duration) {
        *self.load_delay.lock().unwrap() = delay;
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

impl RecordStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn load_all(&self) -> Result<Vec<SaleRecord>> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        if self.fail_loads.load(Ordering::Relaxed) {
            return Err(AppError::Backend("backend unreachable".to_string()));
        }
        let records = self.records();
        let delay = *self.load_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(records)
    }

    async fn append(&self, record: &SaleRecord) -> Result<()> {
        if self.fail_appends.load(Ordering::Relaxed) {
            return Err(AppError::Backend("write rejected".to_string()));
        }
        self.push(record.clone());
        Ok(())
    }
}

/// A sale with a category matching `runs` under the default run table.
/// `amount` goes through its shortest decimal text, so `0.1` is exactly 0.1.
pub fn sale(player: &str, team: &str, runs: u32, amount: f64) -> SaleRecord {
    let category = match runs {
        100 => SaleCategory::FullTime,
        50 => SaleCategory::PartTime,
        _ => SaleCategory::Hourly,
    };
    SaleRecord {
        player: player.to_string(),
        team: team.to_string(),
        category,
        score: runs,
        amount: amount.to_string().parse::<Decimal>().unwrap(),
        date: NaiveDate::from_ymd_opt(2025, 4, 14).unwrap(),
    }
}
