use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::store::RecordStore;
use crate::types::SaleRecord;

/// Notice shown in place of the leaderboards when the backend could not be read.
pub const LOAD_FAILED_NOTICE: &str = "No data yet: sales records could not be loaded.";

struct Cached {
    records: Arc<Vec<SaleRecord>>,
    loaded_at: Instant,
}

/// Result of one read through the cache.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Arc<Vec<SaleRecord>>,
    /// Set when the load failed and `records` is the empty stand-in.
    pub notice: Option<String>,
    pub from_cache: bool,
}

impl Snapshot {
    pub fn load_failed(&self) -> bool {
        self.notice.is_some()
    }
}

/// Time-bounded cache of the full record set. Reads within `ttl` of the last
/// successful load skip the backend; `invalidate` forces the next read through.
pub struct RecordCache {
    ttl: Duration,
    inner: Mutex<Slot>,
}

#[derive(Default)]
struct Slot {
    cached: Option<Cached>,
    /// Bumped by every `invalidate`. A load that started under an older
    /// generation may have missed an append and must not fill the slot.
    generation: u64,
}

impl RecordCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(Slot::default()),
        }
    }

    /// Cached records if they are still fresh.
    pub fn get(&self) -> Option<Arc<Vec<SaleRecord>>> {
        let Ok(slot) = self.inner.lock() else {
            return None;
        };
        slot.cached
            .as_ref()
            .filter(|c| c.loaded_at.elapsed() < self.ttl)
            .map(|c| Arc::clone(&c.records))
    }

    fn generation(&self) -> Option<u64> {
        self.inner.lock().ok().map(|slot| slot.generation)
    }

    /// Cache `records` only if no invalidation happened since `generation`
    /// was read. The records are handed back either way.
    fn put_if_current(&self, records: Vec<SaleRecord>, generation: Option<u64>) -> Arc<Vec<SaleRecord>> {
        let records = Arc::new(records);
        if let Ok(mut slot) = self.inner.lock() {
            if Some(slot.generation) == generation {
                slot.cached = Some(Cached {
                    records: Arc::clone(&records),
                    loaded_at: Instant::now(),
                });
            } else {
                debug!("Discarding load that raced an invalidation");
            }
        }
        records
    }

    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.inner.lock() {
            slot.cached = None;
            slot.generation = slot.generation.wrapping_add(1);
        }
        debug!("Record cache invalidated");
    }

    /// Read through the cache. A backend failure is logged and turned into an
    /// empty record set with a notice; failures are never cached.
    pub async fn load<S: RecordStore>(&self, store: &S) -> Snapshot {
        if let Some(records) = self.get() {
            return Snapshot {
                records,
                notice: None,
                from_cache: true,
            };
        }

        let generation = self.generation();
        match store.load_all().await {
            Ok(records) => {
                debug!("Loaded {} records from {}", records.len(), store.kind());
                Snapshot {
                    records: self.put_if_current(records, generation),
                    notice: None,
                    from_cache: false,
                }
            }
            Err(e) => {
                warn!("Loading records from {} failed: {e}", store.kind());
                Snapshot {
                    records: Arc::new(Vec::new()),
                    notice: Some(LOAD_FAILED_NOTICE.to_string()),
                    from_cache: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{sale, MemoryStore};

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let store = MemoryStore::with_records(vec![sale("Alice", "TeamA", 100, 1.0)]);
        let cache = RecordCache::new(Duration::from_secs(60));

        let first = cache.load(&store).await;
        let second = cache.load(&store).await;

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(second.records.len(), 1);
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let store = MemoryStore::with_records(Vec::new());
        let cache = RecordCache::new(Duration::from_secs(60));

        assert!(cache.load(&store).await.records.is_empty());
        store.push(sale("Bob", "TeamA", 50, 2.0));
        assert!(cache.load(&store).await.records.is_empty(), "stale until invalidated");

        cache.invalidate();
        assert_eq!(cache.load(&store).await.records.len(), 1);
        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test]
    async fn zero_ttl_always_reloads() {
        let store = MemoryStore::with_records(Vec::new());
        let cache = RecordCache::new(Duration::ZERO);
        cache.load(&store).await;
        cache.load(&store).await;
        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test]
    async fn failed_load_becomes_empty_notice_and_is_not_cached() {
        let store = MemoryStore::with_records(vec![sale("Alice", "TeamA", 100, 1.0)]);
        store.fail_loads(true);
        let cache = RecordCache::new(Duration::from_secs(60));

        let snap = cache.load(&store).await;
        assert!(snap.records.is_empty());
        assert!(snap.load_failed());

        store.fail_loads(false);
        let snap = cache.load(&store).await;
        assert!(!snap.load_failed());
        assert_eq!(snap.records.len(), 1);
    }

    #[test]
    fn stale_generation_is_not_cached() {
        let cache = RecordCache::new(Duration::from_secs(60));
        let before = cache.generation();
        cache.invalidate();
        let records = cache.put_if_current(vec![sale("Alice", "TeamA", 100, 1.0)], before);
        assert_eq!(records.len(), 1);
        assert!(cache.get().is_none());

        let current = cache.generation();
        cache.put_if_current(Vec::new(), current);
        assert!(cache.get().is_some());
    }

    #[tokio::test]
    async fn load_in_flight_during_invalidate_does_not_hide_the_append() {
        let store = Arc::new(MemoryStore::with_records(vec![sale("Alice", "TeamA", 100, 1.0)]));
        store.set_load_delay(Duration::from_millis(200));
        let cache = Arc::new(RecordCache::new(Duration::from_secs(60)));

        let in_flight = tokio::spawn({
            let (store, cache) = (Arc::clone(&store), Arc::clone(&cache));
            async move { cache.load(store.as_ref()).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Append acknowledged while the slow read is still running.
        store.push(sale("Bob", "TeamA", 25, 0.0));
        cache.invalidate();

        let stale = in_flight.await.unwrap();
        assert_eq!(stale.records.len(), 1, "the racing read saw the old rows");

        store.set_load_delay(Duration::ZERO);
        let next = cache.load(store.as_ref()).await;
        assert!(!next.from_cache);
        assert_eq!(next.records.len(), 2);
    }
}
