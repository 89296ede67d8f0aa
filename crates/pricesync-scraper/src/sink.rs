//! Persistence collaborator boundary.

use std::future::Future;

use pricesync_core::{Product, Supplier};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize products: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Rejected(String),
}

/// Receives the full, ordered product list of each successfully parsed
/// supplier, once per fetch cycle.
pub trait ProductSink: Sync {
    fn store(
        &self,
        supplier: &Supplier,
        products: &[Product],
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}
