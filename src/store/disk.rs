use crate::core::currency::CurrencyRecord;
use crate::core::error::StoreError;
use crate::core::store::CurrencyStore;
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const PARTITION: &str = "currencies";

/// Currency store backed by a fjall partition.
///
/// Keys are big-endian record ids so iteration yields records in id order,
/// values are the JSON encoded records.
pub struct DiskCurrencyStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
    last_id: AtomicU64,
}

impl DiskCurrencyStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let keyspace = Config::new(path).open()?;
        let partition = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;

        let last_id = match partition.last_key_value()? {
            Some((key, _)) => decode_id(&key)?,
            None => 0,
        };
        debug!(path = %path.display(), last_id, "Opened currency store");

        Ok(Self {
            keyspace,
            partition,
            last_id: AtomicU64::new(last_id),
        })
    }
}

fn decode_id(key: &[u8]) -> Result<u64, StoreError> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| StoreError::InvalidKey(key.len()))?;
    Ok(u64::from_be_bytes(bytes))
}

#[async_trait]
impl CurrencyStore for DiskCurrencyStore {
    async fn find_all(&self) -> Result<Vec<CurrencyRecord>, StoreError> {
        self.partition
            .iter()
            .map(|item| -> Result<CurrencyRecord, StoreError> {
                let (_, value) = item?;
                Ok(serde_json::from_slice(&value)?)
            })
            .collect()
    }

    async fn save(&self, mut record: CurrencyRecord) -> Result<CurrencyRecord, StoreError> {
        let id = match record.id {
            Some(id) => {
                self.last_id.fetch_max(id, Ordering::SeqCst);
                id
            }
            None => self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
        };
        record.id = Some(id);

        self.partition
            .insert(id.to_be_bytes().to_vec(), serde_json::to_vec(&record)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(id, "Store SAVE");
        Ok(record)
    }
}
