use serde::Serialize;
use thiserror::Error;

use crate::transport::TransportError;

/// Failure taxonomy shared by supplier-level errors and diagnostics.
///
/// Callers branch on the kind rather than on concrete error variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network failure, timeout, cancellation or non-2xx status. Per supplier.
    Transport,
    /// Body could not be decoded into an item list. Per supplier.
    Decoding,
    /// One raw item could not be mapped. Per item; siblings are unaffected.
    ItemParse,
    /// Supplier definition cannot be fetched as configured. Per supplier.
    Configuration,
    /// The persistence collaborator rejected a supplier's products.
    Persistence,
    /// The fetch task for a supplier ended abnormally.
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Decoding => "decoding",
            ErrorKind::ItemParse => "item_parse",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Supplier-level fetch failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("request to {url} was cancelled")]
    Cancelled { url: String },

    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected JSON shape from {url}: expected an array or an object with a `data` array, found {found}")]
    UnexpectedShape { url: String, found: &'static str },

    #[error("supplier '{supplier}' has unsupported response format '{format}'")]
    UnsupportedFormat { supplier: String, format: String },

    #[error("supplier '{supplier}' has invalid table selector \"{selector}\": {reason}")]
    InvalidSelector {
        supplier: String,
        selector: String,
        reason: String,
    },
}

impl FetchError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Timeout { .. }
            | FetchError::Cancelled { .. }
            | FetchError::Transport { .. }
            | FetchError::UnexpectedStatus { .. } => ErrorKind::Transport,
            FetchError::Deserialize { .. } | FetchError::UnexpectedShape { .. } => {
                ErrorKind::Decoding
            }
            FetchError::UnsupportedFormat { .. } | FetchError::InvalidSelector { .. } => {
                ErrorKind::Configuration
            }
        }
    }
}
