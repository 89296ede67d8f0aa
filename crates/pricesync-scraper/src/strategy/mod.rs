//! Format-specific parse strategies and their dispatch.
//!
//! The set of formats is closed: [`dispatch`] matches a supplier's
//! [`ResponseFormat`] to exactly one [`ParseStrategy`] variant. Adding a
//! format means adding a variant here and an arm in `dispatch` together.

mod html;
mod json;

use std::time::Duration;

use chrono::{DateTime, Utc};
use pricesync_core::{Product, ResponseFormat, Supplier};
use tokio_util::sync::CancellationToken;

use crate::diagnostics::Diagnostic;
use crate::error::FetchError;
use crate::normalize::ItemOutcome;
use crate::transport::Transport;

pub use html::{HtmlStrategy, DEFAULT_TABLE_SELECTOR};
pub use json::JsonStrategy;

/// Per-supplier request timeout used when the caller does not configure one.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Products parsed from one supplier in one fetch cycle, in payload order.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub products: Vec<Product>,
    /// Raw items excluded after a diagnosed item-level failure. Silently
    /// excluded HTML rows are not counted.
    pub skipped: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub fetched_at: DateTime<Utc>,
}

impl ParseResult {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            products: Vec::new(),
            skipped: 0,
            diagnostics: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Emits `diagnostic` and keeps it on the result.
    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Mapped { product, warning } => {
                if let Some(warning) = warning {
                    self.push_diagnostic(warning);
                }
                self.products.push(product);
            }
            ItemOutcome::Skipped(diagnostic) => {
                self.skipped += 1;
                self.push_diagnostic(diagnostic);
            }
        }
    }
}

/// Everything a strategy needs to perform one supplier's request.
pub struct FetchContext<'a, T> {
    pub transport: &'a T,
    pub timeout: Duration,
    pub cancel: &'a CancellationToken,
}

impl<T: Transport> FetchContext<'_, T> {
    /// Fetches `url` and returns the body of a 2xx response.
    ///
    /// The request is bounded by `timeout` even if the transport ignores it,
    /// and abandoned as soon as `cancel` fires.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Timeout`] when the timeout elapses.
    /// - [`FetchError::Cancelled`] when the cancellation token fires first.
    /// - [`FetchError::Transport`] on a transport failure.
    /// - [`FetchError::UnexpectedStatus`] for any non-2xx status.
    pub async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        let request = tokio::time::timeout(self.timeout, self.transport.request(url, self.timeout));

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                return Err(FetchError::Cancelled { url: url.to_owned() });
            }
            result = request => result,
        };

        let timeout_error = || FetchError::Timeout {
            url: url.to_owned(),
            timeout_secs: self.timeout.as_secs(),
        };

        let response = match result {
            Err(_elapsed) => return Err(timeout_error()),
            Ok(Err(crate::transport::TransportError::Timeout)) => return Err(timeout_error()),
            Ok(Err(source)) => {
                return Err(FetchError::Transport {
                    url: url.to_owned(),
                    source,
                })
            }
            Ok(Ok(response)) => response,
        };

        if !response.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: response.status,
                url: url.to_owned(),
            });
        }

        tracing::debug!(url, bytes = response.body.len(), "fetched supplier body");
        Ok(response.body)
    }
}

/// Extraction algorithm for one response format.
#[derive(Debug, Clone)]
pub enum ParseStrategy {
    Json(JsonStrategy),
    Html(HtmlStrategy),
}

impl ParseStrategy {
    /// Fetches `supplier`'s endpoint and parses it into products.
    ///
    /// # Errors
    ///
    /// Returns the supplier-level [`FetchError`] of the underlying strategy.
    pub async fn fetch<T: Transport>(
        &self,
        supplier: &Supplier,
        ctx: &FetchContext<'_, T>,
    ) -> Result<ParseResult, FetchError> {
        match self {
            ParseStrategy::Json(strategy) => strategy.fetch(supplier, ctx).await,
            ParseStrategy::Html(strategy) => strategy.fetch(supplier, ctx).await,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ParseStrategy::Json(_) => "json",
            ParseStrategy::Html(_) => "html",
        }
    }
}

/// Selects the strategy for `supplier`'s response format.
///
/// Performs no I/O.
///
/// # Errors
///
/// Returns a configuration-kind [`FetchError`]: [`FetchError::UnsupportedFormat`]
/// for an unknown format tag, or [`FetchError::InvalidSelector`] for an HTML
/// supplier whose table selector does not parse.
pub fn dispatch(supplier: &Supplier) -> Result<ParseStrategy, FetchError> {
    match &supplier.format {
        ResponseFormat::Json => Ok(ParseStrategy::Json(JsonStrategy)),
        ResponseFormat::Html => HtmlStrategy::for_supplier(supplier).map(ParseStrategy::Html),
        ResponseFormat::Unsupported(tag) => Err(FetchError::UnsupportedFormat {
            supplier: supplier.name.clone(),
            format: tag.clone(),
        }),
    }
}
