//! `fetch` and `suppliers` command handlers.
//!
//! Per-supplier failures are reported and skipped rather than propagated, so
//! one bad supplier does not abort the run. Only a run in which every
//! selected supplier failed is an error.

use std::path::Path;

use anyhow::Context as _;
use pricesync_core::{load_suppliers, AppConfig, Supplier, SuppliersFile};
use pricesync_scraper::{FetchOutcome, HttpTransport, IngestionOrchestrator, IngestionReport};
use tokio_util::sync::CancellationToken;

use crate::store::JsonFileSink;

/// Picks the suppliers for a fetch run.
///
/// With `filter`, returns that single supplier (matched case-insensitively)
/// and errors if it is missing or inactive. Otherwise returns every active
/// supplier in file order.
pub(crate) fn select_suppliers(
    file: &SuppliersFile,
    filter: Option<&str>,
) -> anyhow::Result<Vec<Supplier>> {
    if let Some(name) = filter {
        let supplier = file
            .find(name)
            .ok_or_else(|| anyhow::anyhow!("supplier '{name}' not found in suppliers file"))?;
        if !supplier.is_active {
            anyhow::bail!("supplier '{name}' is inactive; set is_active: true to fetch it");
        }
        return Ok(vec![supplier.clone()]);
    }

    let active: Vec<Supplier> = file.active().cloned().collect();
    let inactive = file.suppliers.len() - active.len();
    if inactive > 0 {
        tracing::info!(inactive, "skipping inactive suppliers");
    }
    Ok(active)
}

/// Fetches the selected suppliers concurrently and writes each successful
/// supplier's products to `output_dir`.
///
/// When `dry_run` is `true` the selected suppliers are printed and nothing
/// is fetched.
///
/// # Errors
///
/// Returns an error if the suppliers file cannot be loaded, the supplier
/// filter matches nothing, the HTTP transport cannot be built, or every
/// selected supplier failed.
pub(crate) async fn run_fetch(
    config: &AppConfig,
    supplier_filter: Option<&str>,
    output_dir: &Path,
    dry_run: bool,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let file = load_suppliers(&config.suppliers_path).with_context(|| {
        format!(
            "failed to load suppliers from {}",
            config.suppliers_path.display()
        )
    })?;
    let suppliers = select_suppliers(&file, supplier_filter)?;
    for supplier in &suppliers {
        warn_non_canonical_vocabulary(supplier);
    }

    if suppliers.is_empty() {
        println!("no active suppliers configured");
        return Ok(());
    }

    if dry_run {
        let names: Vec<&str> = suppliers.iter().map(|s| s.name.as_str()).collect();
        println!(
            "dry-run: would fetch {} suppliers into {}: [{}]",
            suppliers.len(),
            output_dir.display(),
            names.join(", ")
        );
        return Ok(());
    }

    let transport = HttpTransport::new(&config.user_agent)
        .map_err(|e| anyhow::anyhow!("failed to build HTTP transport: {e}"))?;
    let orchestrator = IngestionOrchestrator::new(transport).with_timeout(config.fetch_timeout());
    let sink = JsonFileSink::new(output_dir);

    let report = orchestrator.ingest(&suppliers, &sink, cancel).await;
    print_report(&report);

    if report.failed() > 0 {
        tracing::warn!(
            failed_suppliers = report.failed(),
            total_suppliers = report.suppliers.len(),
            "some suppliers failed during fetch"
        );
    }
    if report.all_failed() {
        anyhow::bail!("all {} suppliers failed to fetch", report.suppliers.len());
    }
    Ok(())
}

/// Loads and validates the suppliers file, then lists its suppliers.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub(crate) fn run_list_suppliers(config: &AppConfig) -> anyhow::Result<()> {
    let file = load_suppliers(&config.suppliers_path).with_context(|| {
        format!(
            "failed to load suppliers from {}",
            config.suppliers_path.display()
        )
    })?;

    println!(
        "{} suppliers in {}",
        file.suppliers.len(),
        config.suppliers_path.display()
    );
    for supplier in &file.suppliers {
        println!("{}", describe_supplier(supplier));
    }
    Ok(())
}

pub(crate) fn describe_supplier(supplier: &Supplier) -> String {
    let state = if supplier.is_active { "active" } else { "inactive" };
    let mapping = if supplier.mapping.is_some() {
        "mapped"
    } else {
        "no mapping"
    };
    let mut line = format!(
        "  {name} [{format}, {state}, {mapping}] {endpoint}",
        name = supplier.name,
        format = supplier.format,
        endpoint = supplier.endpoint,
    );
    let odd: Vec<String> = supplier
        .status_vocabulary
        .non_canonical_targets()
        .map(|(token, target)| format!("{token} -> {target}"))
        .collect();
    if !odd.is_empty() {
        line = format!(
            "{line}\n    warning: status targets other than \"1\"/\"0\" always read as \"0\": {}",
            odd.join(", ")
        );
    }
    line
}

/// Logs each status vocabulary entry that can never yield an active product.
fn warn_non_canonical_vocabulary(supplier: &Supplier) {
    for (token, target) in supplier.status_vocabulary.non_canonical_targets() {
        tracing::warn!(
            supplier = %supplier.name,
            token,
            target,
            "status vocabulary target is not \"1\" or \"0\"; it normalizes to \"0\""
        );
    }
}

fn print_report(report: &IngestionReport) {
    for entry in &report.suppliers {
        match &entry.outcome {
            FetchOutcome::Succeeded(result) => {
                let saved = if entry.persisted { "saved" } else { "not saved" };
                println!(
                    "  ok    {}: {} products, {} skipped, {} diagnostics ({saved})",
                    entry.supplier,
                    result.len(),
                    result.skipped,
                    result.diagnostics.len()
                );
            }
            FetchOutcome::Failed(failure) => {
                println!(
                    "  FAIL  {}: [{}] {}",
                    entry.supplier, failure.kind, failure.detail
                );
            }
        }
    }
    println!(
        "fetched {} products from {}/{} suppliers",
        report.total_products(),
        report.succeeded(),
        report.suppliers.len()
    );
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
