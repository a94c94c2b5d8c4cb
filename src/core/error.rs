//! Error types shared by the provider, store and service layers.

use thiserror::Error;

/// Errors raised while fetching a rate from the upstream provider.
///
/// Every variant carries the currency code that was requested.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the response could not be read.
    #[error("Failed to fetch exchange rate for currency: {code}")]
    Transport {
        code: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not valid JSON for the expected shape.
    #[error("Failed to parse exchange rate response for currency: {code}")]
    Malformed {
        code: String,
        #[source]
        source: serde_json::Error,
    },

    /// Upstream answered with a non-success status.
    #[error("Upstream returned HTTP {status} for currency: {code}")]
    Status { code: String, status: u16 },

    /// The response did not contain a rate for the requested code.
    #[error("No exchange rate returned for currency: {code}")]
    MissingRate { code: String },
}

impl FetchError {
    pub fn code(&self) -> &str {
        match self {
            FetchError::Transport { code, .. }
            | FetchError::Malformed { code, .. }
            | FetchError::Status { code, .. }
            | FetchError::MissingRate { code } => code,
        }
    }
}

/// Errors raised by a currency store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] fjall::Error),

    #[error("Failed to encode or decode currency record: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Invalid record key of {0} bytes")]
    InvalidKey(usize),
}

/// Failure of a single record within a refresh pass.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Currency record {id:?} has no quote code")]
    MissingCode { id: Option<u64> },
}
