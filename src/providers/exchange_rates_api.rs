use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::core::config::{MissingRatePolicy, ProviderConfig};
use crate::core::error::FetchError;
use crate::core::provider::RateProvider;

/// Client for exchangeratesapi.io style `latest` endpoints.
///
/// The request URL is built from a template holding `{apiKey}` and `{code}`
/// placeholders, so any provider with the same response shape can be used.
pub struct ExchangeRatesApiProvider {
    url_template: String,
    api_key: String,
    timeout: Duration,
    missing_rate: MissingRatePolicy,
    client: reqwest::Client,
}

impl ExchangeRatesApiProvider {
    pub fn new(url_template: &str, api_key: &str) -> Self {
        ExchangeRatesApiProvider {
            url_template: url_template.to_string(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(30),
            missing_rate: MissingRatePolicy::default(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        let client = reqwest::Client::builder().user_agent("xrates/0.1").build()?;
        Ok(ExchangeRatesApiProvider {
            client,
            ..Self::new(&config.url, &api_key)
                .with_timeout(config.timeout())
                .with_missing_rate(config.missing_rate)
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_missing_rate(mut self, policy: MissingRatePolicy) -> Self {
        self.missing_rate = policy;
        self
    }

    fn request_url(&self, code: &str) -> String {
        self.url_template
            .replace("{apiKey}", &self.api_key)
            .replace("{code}", code)
    }

    fn missing(&self, err: FetchError) -> Result<Decimal, FetchError> {
        match self.missing_rate {
            MissingRatePolicy::Degrade => {
                warn!(code = err.code(), reason = %err, "Using degraded rate of 1");
                Ok(Decimal::ONE)
            }
            MissingRatePolicy::Fail => Err(err),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    timestamp: i64,
    base: Option<String>,
    date: Option<String>,
    #[serde(default)]
    rates: HashMap<String, Decimal>,
}

#[async_trait]
impl RateProvider for ExchangeRatesApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self), fields(code = %code))]
    async fn fetch_rate(&self, code: &str) -> Result<Decimal, FetchError> {
        // The url carries the api key, keep it out of the logs
        debug!("Requesting exchange rate");

        let response = self
            .client
            .get(self.request_url(code))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                code: code.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return self.missing(FetchError::Status {
                code: code.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                code: code.to_string(),
                source,
            })?;

        if text.trim().is_empty() {
            return self.missing(FetchError::MissingRate {
                code: code.to_string(),
            });
        }

        let data: Option<LatestRatesResponse> =
            serde_json::from_str(&text).map_err(|source| FetchError::Malformed {
                code: code.to_string(),
                source,
            })?;

        let Some(data) = data else {
            return self.missing(FetchError::MissingRate {
                code: code.to_string(),
            });
        };

        debug!(
            success = data.success,
            timestamp = data.timestamp,
            base = ?data.base,
            date = ?data.date,
            "Received exchange rates"
        );

        match data.rates.get(code) {
            Some(rate) => Ok(*rate),
            None => self.missing(FetchError::MissingRate {
                code: code.to_string(),
            }),
        }
    }
}
