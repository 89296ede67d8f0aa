//! Normalization of one raw supplier item into a canonical [`Product`].
//!
//! Both the JSON and the HTML strategies route every item through
//! [`NormalizationMapper`], so price cleaning and status vocabulary rules are
//! identical regardless of the payload format.

use pricesync_core::{CanonicalField, FieldMapping, Product, StatusVocabulary};
use serde_json::Value;

use crate::diagnostics::{Diagnostic, Severity};

/// Result of mapping one raw item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A product was produced. `warning` is set when a field was malformed
    /// and coerced (e.g. a non-numeric price stored as `0`).
    Mapped {
        product: Product,
        warning: Option<Diagnostic>,
    },
    /// The item could not be mapped and is excluded from the result.
    Skipped(Diagnostic),
}

/// Maps raw items for one supplier using its field mapping and status
/// vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct NormalizationMapper<'a> {
    supplier: &'a str,
    mapping: &'a FieldMapping,
    vocabulary: &'a StatusVocabulary,
}

impl<'a> NormalizationMapper<'a> {
    #[must_use]
    pub fn new(
        supplier: &'a str,
        mapping: &'a FieldMapping,
        vocabulary: &'a StatusVocabulary,
    ) -> Self {
        Self {
            supplier,
            mapping,
            vocabulary,
        }
    }

    /// Maps the raw item at `index` in the payload.
    ///
    /// Fields are extracted in order code, description, price, status. A
    /// canonical field with no mapping entry, or whose source key is absent
    /// from the item, reads as an empty string. Only a non-object item is
    /// skipped.
    #[must_use]
    pub fn map_item(&self, index: usize, item: &Value) -> ItemOutcome {
        let Value::Object(fields) = item else {
            return ItemOutcome::Skipped(Diagnostic::item(
                self.supplier,
                index,
                Severity::Warning,
                format!(
                    "skipping item: expected an object, found {}",
                    json_type_name(item)
                ),
            ));
        };

        let source =
            |field: CanonicalField| self.mapping.source_for(field).and_then(|key| fields.get(key));
        let read =
            |field: CanonicalField| -> String { source(field).map(stringify).unwrap_or_default() };

        let code = read(CanonicalField::Code);
        let description = read(CanonicalField::Description);
        let raw_price = read(CanonicalField::Price);
        let raw_status = read(CanonicalField::Status);

        let price = parse_price(&raw_price);
        let fractional = source(CanonicalField::Price).is_some_and(is_fractional_number);
        let warning = if price == 0 && !is_zero_price(&raw_price) {
            Some(format!("malformed price {raw_price:?} for product {code:?}; stored as 0"))
        } else if fractional {
            Some(format!(
                "numeric price {raw_price} for product {code:?} has a fractional part; \
                 separators are stripped, stored as {price}"
            ))
        } else {
            None
        }
        .map(|message| Diagnostic::item(self.supplier, index, Severity::Warning, message));

        let status = self.vocabulary.normalize(&raw_status).to_owned();

        ItemOutcome::Mapped {
            product: Product {
                code,
                description,
                price,
                status,
            },
            warning,
        }
    }
}

/// Parses a supplier price into the minor currency unit.
///
/// `.` and `,` are always treated as thousands separators and removed, so
/// `"10.000"` and `"10,000"` both parse to `10000` and `"10.50"` parses to
/// `1050`. Anything that is not all ASCII digits after removal (including
/// negative numbers, blanks and values too large for `u64`) coerces to `0`.
#[must_use]
pub fn parse_price(raw: &str) -> u64 {
    let stripped: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != ',')
        .collect();

    if stripped.is_empty() || !stripped.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }

    stripped.parse::<u64>().unwrap_or(0)
}

/// `true` for prices that are legitimately zero (blank or all zero digits),
/// which should not be reported as malformed.
fn is_zero_price(raw: &str) -> bool {
    raw.trim()
        .chars()
        .all(|c| c == '0' || c == '.' || c == ',')
}

/// `true` for a JSON number stored as a float, e.g. `10000.0`.
fn is_fractional_number(value: &Value) -> bool {
    matches!(value, Value::Number(n) if n.is_f64())
}

/// Renders a JSON value as the source text a supplier meant: strings
/// verbatim, null as empty, everything else as compact JSON.
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
