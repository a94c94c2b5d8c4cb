use super::ui;
use crate::core::currency::CurrencyRecord;
use crate::core::store::CurrencyStore;
use crate::service::{CurrencyService, RefreshReport};
use anyhow::Result;
use comfy_table::Cell;

pub fn currencies_table(records: &[CurrencyRecord]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Base"),
        ui::header_cell("Code"),
        ui::header_cell("Rate"),
    ]);

    for record in records {
        table.add_row(vec![
            ui::format_optional_cell(record.id, |id| id.to_string()),
            Cell::new(&record.base),
            ui::format_optional_cell(record.code.as_deref(), str::to_string),
            ui::rate_cell(record.exchange_rate),
        ]);
    }
    table.to_string()
}

pub fn report_summary(report: &RefreshReport) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Exchange rate refresh", ui::StyleType::Title)
    );
    output.push_str(&currencies_table(&report.refreshed));

    let elapsed = report.finished_at - report.started_at;
    output.push_str(&format!(
        "\n\n{}: {} ({} ms)",
        ui::style_text("Refreshed", ui::StyleType::TotalLabel),
        ui::style_text(
            &format!("{}/{}", report.refreshed.len(), report.total()),
            ui::StyleType::TotalValue
        ),
        elapsed.num_milliseconds()
    ));

    for failure in &report.failures {
        let pair = failure
            .key
            .as_ref()
            .map_or("N/A".to_string(), |key| key.to_string());
        output.push_str(&format!(
            "\n{} {}",
            ui::style_text(&pair, ui::StyleType::Subtle),
            ui::style_text(&failure.error.to_string(), ui::StyleType::Error)
        ));
    }
    output
}

/// Prints every stored currency.
pub async fn list(store: &dyn CurrencyStore) -> Result<()> {
    let records = store.find_all().await?;
    println!("{}", currencies_table(&records));
    Ok(())
}

/// Runs a single reconciliation pass and prints what happened.
pub async fn refresh(service: &CurrencyService) -> Result<()> {
    let pb = ui::new_spinner("Refreshing exchange rates...");
    let report = service.refresh_exchange_rates().await;
    pb.finish_and_clear();

    println!("{}", report_summary(&report?));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CacheKey;
    use crate::core::error::RefreshError;
    use crate::service::RefreshFailure;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currencies_table_lists_records() {
        let records = vec![
            CurrencyRecord {
                id: Some(1),
                exchange_rate: dec!(1.1),
                ..CurrencyRecord::new("EUR", "USD")
            },
            CurrencyRecord {
                id: Some(2),
                ..CurrencyRecord::new("EUR", "JPY")
            },
        ];

        let table = currencies_table(&records);
        assert!(table.contains("USD"));
        assert!(table.contains("1.1"));
        assert!(table.contains("JPY"));
        assert!(table.contains("pending"));
    }

    #[test]
    fn test_report_summary_includes_failures() {
        let now = Utc::now();
        let report = RefreshReport {
            started_at: now,
            finished_at: now,
            refreshed: vec![CurrencyRecord {
                id: Some(1),
                exchange_rate: dec!(1.5),
                ..CurrencyRecord::new("EUR", "CAD")
            }],
            failures: vec![RefreshFailure {
                id: Some(2),
                key: Some(CacheKey::new("EUR", "XXX")),
                error: RefreshError::MissingCode { id: Some(2) },
            }],
        };

        let summary = report_summary(&report);
        assert!(summary.contains("CAD"));
        assert!(summary.contains("1/2"));
        assert!(summary.contains("EUR-XXX"));
        assert!(summary.contains("has no quote code"));
    }
}
