//! Currency service: ties the store, the rate cache and the upstream provider together.

use crate::core::cache::RateCache;
use crate::core::currency::{CacheKey, CurrencyRecord};
use crate::core::error::{FetchError, RefreshError, StoreError};
use crate::core::provider::RateProvider;
use crate::core::store::CurrencyStore;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A record that could not be refreshed in a pass.
#[derive(Debug)]
pub struct RefreshFailure {
    pub id: Option<u64>,
    pub key: Option<CacheKey>,
    pub error: RefreshError,
}

/// Outcome of one reconciliation pass.
#[derive(Debug)]
pub struct RefreshReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub refreshed: Vec<CurrencyRecord>,
    pub failures: Vec<RefreshFailure>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.refreshed.len() + self.failures.len()
    }
}

pub struct CurrencyService {
    store: Arc<dyn CurrencyStore>,
    provider: Arc<dyn RateProvider>,
    cache: RateCache,
    base_currency: String,
}

impl CurrencyService {
    /// Creates the service with an empty rate cache.
    pub fn new(
        store: Arc<dyn CurrencyStore>,
        provider: Arc<dyn RateProvider>,
        base_currency: &str,
    ) -> Self {
        CurrencyService {
            store,
            provider,
            cache: RateCache::new(),
            base_currency: base_currency.to_string(),
        }
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    /// All persisted records, straight from the store.
    pub async fn list_currencies(&self) -> Result<Vec<CurrencyRecord>, StoreError> {
        self.store.find_all().await
    }

    /// Cached record for `code`.
    ///
    /// `code` is either a quote code, looked up against the configured base currency,
    /// or a full `BASE-QUOTE` key.
    pub fn get_exchange_rate(&self, code: &str) -> Option<CurrencyRecord> {
        let key = CacheKey::parse(code).unwrap_or_else(|| CacheKey::new(&self.base_currency, code));
        self.cache.get(&key)
    }

    /// Persists a new record for `code` with a zero rate.
    ///
    /// The cache is left alone, the record becomes visible to lookups after the next refresh.
    pub async fn add_currency(&self, code: &str) -> Result<CurrencyRecord, StoreError> {
        let record = CurrencyRecord::new(&self.base_currency, code);
        let saved = self.store.save(record).await?;
        info!(id = ?saved.id, base = %saved.base, code, "Added currency");
        Ok(saved)
    }

    pub async fn fetch_exchange_rate_from_api(&self, code: &str) -> Result<Decimal, FetchError> {
        self.provider.fetch_rate(code).await
    }

    /// Fetches a fresh rate for every stored record, one at a time.
    ///
    /// A failure for one record is recorded in the report and the pass moves on.
    /// Only a failure to list the records aborts the pass.
    #[instrument(name = "RefreshExchangeRates", skip(self))]
    pub async fn refresh_exchange_rates(&self) -> Result<RefreshReport, StoreError> {
        let started_at = Utc::now();
        let records = self.store.find_all().await?;
        debug!(count = records.len(), "Refreshing exchange rates");

        let mut refreshed = Vec::with_capacity(records.len());
        let mut failures = Vec::new();

        for record in records {
            let id = record.id;
            let key = record.cache_key();
            match self.refresh_record(record).await {
                Ok(updated) => refreshed.push(updated),
                Err(error) => {
                    warn!(?id, key = ?key.as_ref().map(CacheKey::as_str), %error, "Failed to refresh currency");
                    failures.push(RefreshFailure { id, key, error });
                }
            }
        }

        let report = RefreshReport {
            started_at,
            finished_at: Utc::now(),
            refreshed,
            failures,
        };
        info!(
            refreshed = report.refreshed.len(),
            failed = report.failures.len(),
            "Exchange rate refresh finished"
        );
        Ok(report)
    }

    async fn refresh_record(&self, mut record: CurrencyRecord) -> Result<CurrencyRecord, RefreshError> {
        let (Some(key), Some(code)) = (record.cache_key(), record.code.clone()) else {
            return Err(RefreshError::MissingCode { id: record.id });
        };

        record.exchange_rate = self.provider.fetch_rate(&code).await?;
        self.cache.put(key, record.clone());
        Ok(self.store.save(record).await?)
    }
}
