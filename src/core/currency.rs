//! Currency records and the composite key used to cache them

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A persisted currency pair and its latest known exchange rate.
///
/// A rate of zero means the pair has been added but not fetched yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRecord {
    pub id: Option<u64>,
    pub base: String,
    pub code: Option<String>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub exchange_rate: Decimal,
}

impl CurrencyRecord {
    /// Creates an unsaved record for `base`/`code` with a zero rate.
    pub fn new(base: &str, code: &str) -> Self {
        Self {
            id: None,
            base: base.to_string(),
            code: Some(code.to_string()),
            exchange_rate: Decimal::ZERO,
        }
    }

    /// Cache key for this record, if it has a quote code.
    pub fn cache_key(&self) -> Option<CacheKey> {
        self.code
            .as_deref()
            .map(|code| CacheKey::new(&self.base, code))
    }
}

/// Composite `BASE-QUOTE` key of the rate cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(base: &str, code: &str) -> Self {
        CacheKey(format!("{base}-{code}"))
    }

    /// Accepts an already composed `BASE-QUOTE` key.
    ///
    /// Returns `None` unless both halves are non-empty.
    pub fn parse(key: &str) -> Option<Self> {
        match key.split_once('-') {
            Some((base, code)) if !base.is_empty() && !code.is_empty() => {
                Some(CacheKey::new(base, code))
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
