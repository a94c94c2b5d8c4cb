use crate::core::currency::CurrencyRecord;
use crate::core::error::StoreError;
use crate::core::store::CurrencyStore;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct MemoryState {
    records: BTreeMap<u64, CurrencyRecord>,
    last_id: u64,
}

/// Non-persistent store, records are lost when the process exits.
#[derive(Default)]
pub struct MemoryCurrencyStore {
    inner: Mutex<MemoryState>,
}

impl MemoryCurrencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`, assigning ids where missing.
    pub async fn with_records(records: Vec<CurrencyRecord>) -> Result<Self, StoreError> {
        let store = Self::new();
        for record in records {
            store.save(record).await?;
        }
        Ok(store)
    }
}

#[async_trait]
impl CurrencyStore for MemoryCurrencyStore {
    async fn find_all(&self) -> Result<Vec<CurrencyRecord>, StoreError> {
        let state = self.inner.lock().await;
        Ok(state.records.values().cloned().collect())
    }

    async fn save(&self, mut record: CurrencyRecord) -> Result<CurrencyRecord, StoreError> {
        let mut state = self.inner.lock().await;
        let id = match record.id {
            Some(id) => id,
            None => state.last_id + 1,
        };
        state.last_id = state.last_id.max(id);
        record.id = Some(id);
        debug!(id, "Store SAVE");
        state.records.insert(id, record.clone());
        Ok(record)
    }
}
