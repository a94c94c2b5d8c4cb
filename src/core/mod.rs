//! Core abstractions and types shared across the crate

pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod provider;
pub mod store;

// Re-export main types for cleaner imports
pub use cache::RateCache;
pub use currency::{CacheKey, CurrencyRecord};
pub use error::{FetchError, RefreshError, StoreError};
pub use provider::RateProvider;
pub use store::CurrencyStore;
