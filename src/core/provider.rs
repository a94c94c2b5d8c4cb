//! Upstream exchange-rate provider abstraction

use crate::core::error::FetchError;
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Latest rate of `code` against the provider's base currency.
    async fn fetch_rate(&self, code: &str) -> Result<Decimal, FetchError>;
}
