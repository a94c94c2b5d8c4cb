//! Persistent currency storage abstraction

use crate::core::currency::CurrencyRecord;
use crate::core::error::StoreError;
use async_trait::async_trait;

#[async_trait]
pub trait CurrencyStore: Send + Sync {
    /// All stored records, ordered by id.
    async fn find_all(&self) -> Result<Vec<CurrencyRecord>, StoreError>;

    /// Inserts or replaces a record.
    ///
    /// A record without an id is assigned the next free id. The stored record is returned.
    async fn save(&self, record: CurrencyRecord) -> Result<CurrencyRecord, StoreError>;
}
