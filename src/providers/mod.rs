pub mod exchange_rates_api;

pub use exchange_rates_api::ExchangeRatesApiProvider;
