pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::store::CurrencyStore;
use anyhow::{Context, Result};
use disk::DiskCurrencyStore;
use memory::MemoryCurrencyStore;
use std::sync::Arc;
use tracing::info;

/// Opens the store selected by `storage.persist`.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn CurrencyStore>> {
    if !config.storage.persist {
        info!("Using in-memory currency store");
        return Ok(Arc::new(MemoryCurrencyStore::new()));
    }

    let path = config.default_data_path()?.join("currencies");
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
    let store = DiskCurrencyStore::open(&path)
        .with_context(|| format!("Failed to open currency store at {}", path.display()))?;
    info!(path = %path.display(), "Using persistent currency store");
    Ok(Arc::new(store))
}
