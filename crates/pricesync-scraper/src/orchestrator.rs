//! Concurrent multi-supplier fetch with per-supplier failure containment.
//!
//! Every supplier gets its own task. Tasks share nothing mutable: each reads
//! its own [`Supplier`] and produces its own [`FetchOutcome`]. The
//! orchestrator joins all of them before aggregating, so one supplier's
//! failure, slowness or panic never affects another supplier's outcome.

use std::sync::Arc;
use std::time::Duration;

use pricesync_core::Supplier;
use tokio_util::sync::CancellationToken;

use crate::diagnostics::{Diagnostic, Severity};
use crate::error::{ErrorKind, FetchError};
use crate::sink::ProductSink;
use crate::strategy::{dispatch, FetchContext, ParseResult, DEFAULT_FETCH_TIMEOUT};
use crate::transport::Transport;

/// Why a supplier's fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: ErrorKind,
    pub detail: String,
}

impl FetchFailure {
    /// Supplier-level error event describing this failure.
    #[must_use]
    pub fn diagnostic(&self, supplier: &str) -> Diagnostic {
        Diagnostic::supplier(
            supplier,
            self.kind,
            Severity::Error,
            format!("fetch failed: {}", self.detail),
        )
    }
}

impl From<&FetchError> for FetchFailure {
    fn from(err: &FetchError) -> Self {
        Self {
            kind: err.kind(),
            detail: err.to_string(),
        }
    }
}

/// Terminal result of one supplier's fetch.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Succeeded(ParseResult),
    Failed(FetchFailure),
}

impl FetchOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Succeeded(_))
    }

    #[must_use]
    pub fn products(&self) -> &[pricesync_core::Product] {
        match self {
            FetchOutcome::Succeeded(result) => &result.products,
            FetchOutcome::Failed(_) => &[],
        }
    }

    #[must_use]
    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match self {
            FetchOutcome::Succeeded(_) => None,
            FetchOutcome::Failed(failure) => Some(failure.kind),
        }
    }
}

/// One supplier's entry in an [`IngestionReport`].
#[derive(Debug, Clone)]
pub struct SupplierReport {
    pub supplier: String,
    pub module_id: Option<i64>,
    pub outcome: FetchOutcome,
    /// Supplier-level events: the failure of a failed fetch, or a
    /// persistence error. Item-level events live on the [`ParseResult`].
    pub diagnostics: Vec<Diagnostic>,
    /// `true` once the products were accepted by the sink.
    pub persisted: bool,
}

impl SupplierReport {
    fn new(supplier: &Supplier, outcome: FetchOutcome) -> Self {
        let mut report = Self {
            supplier: supplier.name.clone(),
            module_id: supplier.module_id,
            outcome,
            diagnostics: Vec::new(),
            persisted: false,
        };
        if let FetchOutcome::Failed(failure) = &report.outcome {
            let diagnostic = failure.diagnostic(&supplier.name);
            report.push_diagnostic(diagnostic);
        }
        report
    }

    fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
    }

    #[must_use]
    pub fn product_count(&self) -> usize {
        self.outcome.products().len()
    }
}

/// Outcome of a whole fetch cycle: exactly one entry per input supplier, in
/// input order.
#[derive(Debug, Clone, Default)]
pub struct IngestionReport {
    pub suppliers: Vec<SupplierReport>,
}

impl IngestionReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.suppliers
            .iter()
            .filter(|r| r.outcome.is_success())
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.suppliers.len() - self.succeeded()
    }

    #[must_use]
    pub fn total_products(&self) -> usize {
        self.suppliers.iter().map(SupplierReport::product_count).sum()
    }

    /// `true` when there was at least one supplier and none succeeded.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.suppliers.is_empty() && self.succeeded() == 0
    }

    #[must_use]
    pub fn get(&self, supplier: &str) -> Option<&SupplierReport> {
        self.suppliers.iter().find(|r| r.supplier == supplier)
    }
}

/// Runs every supplier's fetch concurrently and collects one outcome each.
pub struct IngestionOrchestrator<T> {
    transport: Arc<T>,
    timeout: Duration,
}

impl<T: Transport + 'static> IngestionOrchestrator<T> {
    /// Creates an orchestrator with the default 15-second per-fetch timeout.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Overrides the per-supplier request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetches a single supplier. Never fails: every error becomes a
    /// [`FetchOutcome::Failed`], and its failure diagnostic is emitted just as
    /// [`fetch_all`](Self::fetch_all) does.
    pub async fn fetch_supplier(
        &self,
        supplier: &Supplier,
        cancel: &CancellationToken,
    ) -> FetchOutcome {
        let outcome = fetch_one(self.transport.as_ref(), self.timeout, supplier, cancel).await;
        if let FetchOutcome::Failed(failure) = &outcome {
            failure.diagnostic(&supplier.name).emit();
        }
        outcome
    }

    /// Fetches all `suppliers` concurrently and waits for every one of them
    /// to settle.
    ///
    /// Returns exactly one report per supplier, in input order. Cancelling
    /// `cancel` makes pending fetches fail with a transport-kind failure; it
    /// never makes this method return early.
    pub async fn fetch_all(
        &self,
        suppliers: &[Supplier],
        cancel: &CancellationToken,
    ) -> Vec<SupplierReport> {
        let handles: Vec<_> = suppliers
            .iter()
            .cloned()
            .map(|supplier| {
                let transport = Arc::clone(&self.transport);
                let cancel = cancel.clone();
                let timeout = self.timeout;
                tokio::spawn(async move {
                    fetch_one(transport.as_ref(), timeout, &supplier, &cancel).await
                })
            })
            .collect();

        let joined = futures::future::join_all(handles).await;

        suppliers
            .iter()
            .zip(joined)
            .map(|(supplier, joined)| {
                let outcome = joined.unwrap_or_else(|e| {
                    FetchOutcome::Failed(FetchFailure {
                        kind: ErrorKind::Internal,
                        detail: format!("fetch task ended abnormally: {e}"),
                    })
                });
                SupplierReport::new(supplier, outcome)
            })
            .collect()
    }

    /// Fetches all suppliers, then hands each successful supplier's products
    /// to `sink`.
    ///
    /// A sink failure is recorded as a persistence diagnostic on that
    /// supplier's report and leaves its outcome untouched.
    pub async fn ingest<S: ProductSink>(
        &self,
        suppliers: &[Supplier],
        sink: &S,
        cancel: &CancellationToken,
    ) -> IngestionReport {
        let mut reports = self.fetch_all(suppliers, cancel).await;

        for (supplier, report) in suppliers.iter().zip(reports.iter_mut()) {
            let FetchOutcome::Succeeded(result) = &report.outcome else {
                continue;
            };
            match sink.store(supplier, &result.products).await {
                Ok(()) => report.persisted = true,
                Err(e) => {
                    let diagnostic = Diagnostic::supplier(
                        &supplier.name,
                        ErrorKind::Persistence,
                        Severity::Error,
                        format!("failed to persist products: {e}"),
                    );
                    report.push_diagnostic(diagnostic);
                }
            }
        }

        let report = IngestionReport { suppliers: reports };
        tracing::info!(
            suppliers = report.suppliers.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            products = report.total_products(),
            "fetch cycle complete"
        );
        report
    }
}

async fn fetch_one<T: Transport>(
    transport: &T,
    timeout: Duration,
    supplier: &Supplier,
    cancel: &CancellationToken,
) -> FetchOutcome {
    let strategy = match dispatch(supplier) {
        Ok(strategy) => strategy,
        Err(e) => return FetchOutcome::Failed(FetchFailure::from(&e)),
    };

    tracing::info!(
        supplier = %supplier.name,
        strategy = strategy.name(),
        url = %supplier.endpoint,
        "fetching supplier price list"
    );

    let ctx = FetchContext {
        transport,
        timeout,
        cancel,
    };
    match strategy.fetch(supplier, &ctx).await {
        Ok(result) => {
            tracing::info!(
                supplier = %supplier.name,
                products = result.len(),
                skipped = result.skipped,
                "supplier fetch succeeded"
            );
            FetchOutcome::Succeeded(result)
        }
        Err(e) => FetchOutcome::Failed(FetchFailure::from(&e)),
    }
}
