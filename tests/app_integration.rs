use rust_decimal_macros::dec;
use std::fs;
use std::sync::Arc;
use tracing::info;
use xrates::core::config::AppConfig;
use xrates::core::currency::{CacheKey, CurrencyRecord};
use xrates::core::store::CurrencyStore;
use xrates::store::disk::DiskCurrencyStore;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const API_KEY: &str = "integration_key";

    /// Upstream answering `symbols=<code>` with the given rate.
    pub async fn create_upstream(rates: &[(&str, f64)]) -> MockServer {
        let mock_server = MockServer::start().await;

        for (code, rate) in rates {
            let body = format!(
                r#"{{"success": true, "timestamp": 1700000000, "base": "EUR", "date": "2024-11-14", "rates": {{"{code}": {rate}}}}}"#
            );
            Mock::given(method("GET"))
                .and(path("/v1/latest"))
                .and(query_param("access_key", API_KEY))
                .and(query_param("symbols", *code))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(&mock_server)
                .await;
        }

        mock_server
    }

    pub fn config_yaml(upstream: &MockServer, storage: &str) -> String {
        format!(
            r#"
base_currency: "EUR"
provider:
  url: "{}/v1/latest?access_key={{apiKey}}&symbols={{code}}"
  api_key: "{API_KEY}"
  timeout_secs: 5
refresh:
  interval_secs: 3600
  on_startup: false
storage:
{storage}
"#,
            upstream.uri()
        )
    }
}

#[test_log::test(tokio::test)]
async fn test_add_refresh_and_read_with_mock_upstream() {
    let upstream = test_utils::create_upstream(&[("USD", 1.1), ("CAD", 1.5)]).await;
    let yaml = test_utils::config_yaml(&upstream, "  persist: false");
    let config: AppConfig = serde_yaml::from_str(&yaml).expect("Failed to parse config");

    let service = xrates::build_service(&config).expect("Failed to build service");
    service.add_currency("USD").await.unwrap();
    service.add_currency("CAD").await.unwrap();
    service.add_currency("JPY").await.unwrap();

    // Nothing is readable before the first refresh
    assert!(service.get_exchange_rate("USD").is_none());

    let report = service.refresh_exchange_rates().await.unwrap();
    info!(
        refreshed = report.refreshed.len(),
        failed = report.failures.len(),
        "Refresh finished"
    );

    assert!(report.is_complete());
    assert_eq!(report.refreshed.len(), 3);
    assert_eq!(
        service
            .cache()
            .get(&CacheKey::new("EUR", "USD"))
            .unwrap()
            .exchange_rate,
        dec!(1.1)
    );
    assert_eq!(service.get_exchange_rate("CAD").unwrap().exchange_rate, dec!(1.5));
    // Upstream has no mock for JPY, it answers 404 and the rate degrades to 1
    assert_eq!(service.get_exchange_rate("JPY").unwrap().exchange_rate, dec!(1));

    let stored = service.list_currencies().await.unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].exchange_rate, dec!(1.1));
    assert_eq!(stored[1].exchange_rate, dec!(1.5));
}

#[test_log::test(tokio::test)]
async fn test_run_refresh_command_with_disk_store() {
    let upstream = test_utils::create_upstream(&[("USD", 1.1)]).await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let storage = format!(
        "  persist: true\n  data_path: \"{}\"",
        data_dir.path().display()
    );

    {
        let store = DiskCurrencyStore::open(&data_dir.path().join("currencies")).unwrap();
        store.save(CurrencyRecord::new("EUR", "USD")).await.unwrap();
    }

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    fs::write(config_path, test_utils::config_yaml(&upstream, &storage))
        .expect("Failed to write config file");

    let result = xrates::run_command(
        xrates::AppCommand::Refresh,
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Refresh command failed with: {:?}",
        result.err()
    );

    let store = DiskCurrencyStore::open(&data_dir.path().join("currencies")).unwrap();
    let stored = store.find_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].exchange_rate, dec!(1.1));
}

#[test_log::test(tokio::test)]
async fn test_list_command_without_provider_credentials() {
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    {
        let store = DiskCurrencyStore::open(&data_dir.path().join("currencies")).unwrap();
        store.save(CurrencyRecord::new("EUR", "USD")).await.unwrap();
    }

    // No provider section at all, so no api key
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(
        config_file.path(),
        format!(
            "storage:\n  persist: true\n  data_path: \"{}\"\n",
            data_dir.path().display()
        ),
    )
    .expect("Failed to write config file");

    let result = xrates::run_command(
        xrates::AppCommand::List,
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "List command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_serve_api_end_to_end() {
    let upstream = test_utils::create_upstream(&[("USD", 1.1)]).await;
    let yaml = test_utils::config_yaml(&upstream, "  persist: false");
    let config: AppConfig = serde_yaml::from_str(&yaml).unwrap();
    let service = xrates::build_service(&config).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api/currencies", listener.local_addr().unwrap());
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(xrates::serve(
        listener,
        Arc::clone(&service),
        config.refresh.clone(),
        async move {
            let _ = shutdown_rx.await;
        },
    ));

    let client = reqwest::Client::new();

    let created: CurrencyRecord = client
        .post(format!("{base_url}/USD"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created.id, Some(1));
    assert_eq!(created.base, "EUR");
    assert_eq!(created.exchange_rate, dec!(0));

    let cached: Option<CurrencyRecord> = client
        .get(format!("{base_url}/USD"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(cached.is_none());

    service.refresh_exchange_rates().await.unwrap();

    let cached: Option<CurrencyRecord> = client
        .get(format!("{base_url}/USD"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cached.unwrap().exchange_rate, dec!(1.1));

    let listed: Vec<CurrencyRecord> = client
        .get(&base_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].exchange_rate, dec!(1.1));

    shutdown_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
