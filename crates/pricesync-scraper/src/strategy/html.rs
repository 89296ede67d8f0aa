//! Tabular HTML price lists.
//!
//! Columns are positional (code, description, price, status). Each eligible
//! row is rebuilt as a keyed item so it goes through the same
//! [`NormalizationMapper`] as JSON items.

use pricesync_core::{CanonicalField, FieldMapping, Supplier};
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};

use super::{FetchContext, ParseResult};
use crate::error::FetchError;
use crate::normalize::NormalizationMapper;
use crate::transport::Transport;

/// Rows scanned when a supplier does not configure `table_selector`.
pub const DEFAULT_TABLE_SELECTOR: &str = "table.tabel tr";

const CELLS_PER_ROW: usize = 4;
const HEADER_FIRST_CELL: &str = "kode";

#[derive(Debug, Clone)]
pub struct HtmlStrategy {
    rows: Selector,
    cells: Selector,
}

impl HtmlStrategy {
    /// Builds the strategy for `supplier`, compiling its row selector.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidSelector`] if `table_selector` is not a
    /// valid CSS selector.
    pub fn for_supplier(supplier: &Supplier) -> Result<Self, FetchError> {
        let selector = supplier
            .table_selector
            .as_deref()
            .unwrap_or(DEFAULT_TABLE_SELECTOR);
        let rows = Selector::parse(selector).map_err(|e| FetchError::InvalidSelector {
            supplier: supplier.name.clone(),
            selector: selector.to_owned(),
            reason: e.to_string(),
        })?;
        let cells = Selector::parse("td").expect("valid cell selector");
        Ok(Self { rows, cells })
    }

    /// Fetches and parses an HTML supplier.
    ///
    /// # Errors
    ///
    /// Transport failures from [`FetchContext::fetch_body`]. HTML parsing
    /// itself never fails.
    pub async fn fetch<T: Transport>(
        &self,
        supplier: &Supplier,
        ctx: &FetchContext<'_, T>,
    ) -> Result<ParseResult, FetchError> {
        let body = ctx.fetch_body(&supplier.endpoint).await?;
        Ok(self.parse(supplier, &body))
    }

    /// Parses the price table out of `body`.
    ///
    /// Columns are positional: code, description, price, status. Rows
    /// without exactly four `td` cells, and the header row whose first cell
    /// reads `kode` in any case, are dropped without a diagnostic.
    #[must_use]
    pub fn parse(&self, supplier: &Supplier, body: &str) -> ParseResult {
        // Positional columns: the supplier's source keys never apply here.
        let mapping = FieldMapping::canonical();
        let mapper = NormalizationMapper::new(&supplier.name, &mapping, &supplier.status_vocabulary);

        let document = Html::parse_document(body);
        let mut result = ParseResult::empty();
        let mut rows_seen = 0usize;

        for (index, row) in document.select(&self.rows).enumerate() {
            rows_seen += 1;
            let cells: Vec<String> = row.select(&self.cells).map(cell_text).collect();
            let Ok(cells) = <[String; CELLS_PER_ROW]>::try_from(cells) else {
                continue;
            };
            if cells[0].to_lowercase() == HEADER_FIRST_CELL {
                continue;
            }

            let item = keyed_item(cells);
            result.record(mapper.map_item(index, &item));
        }

        tracing::debug!(
            supplier = %supplier.name,
            rows = rows_seen,
            products = result.len(),
            "parsed HTML price table"
        );
        result
    }
}

/// Text of a cell: each text fragment trimmed, then concatenated.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}

/// Rebuilds a positional row as `{canonical field: cell}`.
fn keyed_item(cells: [String; CELLS_PER_ROW]) -> Value {
    let item: Map<String, Value> = CanonicalField::ALL
        .into_iter()
        .zip(cells)
        .map(|(field, cell)| (field.as_str().to_owned(), Value::String(cell)))
        .collect();
    Value::Object(item)
}

#[cfg(test)]
#[path = "html_test.rs"]
mod tests;
