pub mod diagnostics;
pub mod error;
pub mod normalize;
pub mod orchestrator;
pub mod sink;
pub mod strategy;
pub mod transport;

pub use diagnostics::{Diagnostic, Severity};
pub use error::{ErrorKind, FetchError};
pub use normalize::{parse_price, ItemOutcome, NormalizationMapper};
pub use orchestrator::{
    FetchFailure, FetchOutcome, IngestionOrchestrator, IngestionReport, SupplierReport,
};
pub use sink::{ProductSink, SinkError};
pub use strategy::{dispatch, FetchContext, ParseResult, ParseStrategy, DEFAULT_FETCH_TIMEOUT};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};
