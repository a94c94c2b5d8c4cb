use crate::core::currency::{CacheKey, CurrencyRecord};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Process-wide map from `BASE-QUOTE` to the latest fetched record.
///
/// Reads and writes lock a single shard, so API readers are never blocked by the
/// refresh pass as a whole. `put` swaps the whole record, readers see either the old
/// or the new one. Entries are never evicted.
#[derive(Clone, Default)]
pub struct RateCache {
    inner: Arc<DashMap<CacheKey, CurrencyRecord>>,
}

impl RateCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<CurrencyRecord> {
        let value = self.inner.get(key).map(|entry| entry.value().clone());
        if value.is_some() {
            debug!(%key, "Cache HIT");
        } else {
            debug!(%key, "Cache MISS");
        }
        value
    }

    pub fn put(&self, key: CacheKey, record: CurrencyRecord) {
        debug!(%key, rate = %record.exchange_rate, "Cache PUT");
        self.inner.insert(key, record);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
