//! JSON-file product sink: one pretty-printed `<supplier-slug>.json` per
//! supplier, overwritten on every fetch cycle.

use std::path::{Path, PathBuf};

use pricesync_core::{Product, Supplier};
use pricesync_scraper::{ProductSink, SinkError};

#[derive(Debug, Clone)]
pub(crate) struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub(crate) fn path_for(&self, supplier: &Supplier) -> PathBuf {
        self.dir.join(format!("{}.json", supplier.slug()))
    }
}

impl ProductSink for JsonFileSink {
    async fn store(&self, supplier: &Supplier, products: &[Product]) -> Result<(), SinkError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let bytes = serde_json::to_vec_pretty(products)?;
        let path = self.path_for(supplier);
        // Staged write plus rename: the target is never partially written.
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, &bytes)
            .await
            .map_err(|e| io_error(&staging, e))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| io_error(&path, e))?;

        tracing::info!(
            supplier = %supplier.name,
            module_id = ?supplier.module_id,
            path = %path.display(),
            products = products.len(),
            "saved supplier products"
        );
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
