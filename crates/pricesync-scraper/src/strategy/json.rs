//! JSON price lists: a top-level array of items, or an object whose `data`
//! key holds the array.

use pricesync_core::{FieldMapping, Supplier};
use serde_json::Value;

use super::{FetchContext, ParseResult};
use crate::diagnostics::{Diagnostic, Severity};
use crate::error::{ErrorKind, FetchError};
use crate::normalize::{json_type_name, NormalizationMapper};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStrategy;

impl JsonStrategy {
    /// Fetches and parses a JSON supplier.
    ///
    /// A supplier without a field mapping is not fetched at all: the result
    /// is empty and carries a configuration diagnostic.
    ///
    /// # Errors
    ///
    /// Transport failures from [`FetchContext::fetch_body`], and
    /// [`FetchError::Deserialize`] / [`FetchError::UnexpectedShape`] when
    /// the body is not a recognised item list.
    pub async fn fetch<T: Transport>(
        &self,
        supplier: &Supplier,
        ctx: &FetchContext<'_, T>,
    ) -> Result<ParseResult, FetchError> {
        let Some(mapping) = supplier.mapping.as_ref() else {
            let mut result = ParseResult::empty();
            result.push_diagnostic(Diagnostic::supplier(
                &supplier.name,
                ErrorKind::Configuration,
                Severity::Warning,
                "field mapping is not configured; skipping JSON supplier".to_owned(),
            ));
            return Ok(result);
        };

        let body = ctx.fetch_body(&supplier.endpoint).await?;
        parse_json_body(supplier, mapping, &body)
    }
}

/// Decodes `body` and maps every item independently.
pub(crate) fn parse_json_body(
    supplier: &Supplier,
    mapping: &FieldMapping,
    body: &str,
) -> Result<ParseResult, FetchError> {
    let value: Value = serde_json::from_str(body).map_err(|e| FetchError::Deserialize {
        context: format!("price list from {}", supplier.endpoint),
        source: e,
    })?;

    let items = extract_items(value).map_err(|found| FetchError::UnexpectedShape {
        url: supplier.endpoint.clone(),
        found,
    })?;

    let mapper = NormalizationMapper::new(&supplier.name, mapping, &supplier.status_vocabulary);
    let mut result = ParseResult::empty();
    for (index, item) in items.iter().enumerate() {
        result.record(mapper.map_item(index, item));
    }

    tracing::debug!(
        supplier = %supplier.name,
        items = items.len(),
        products = result.len(),
        skipped = result.skipped,
        "parsed JSON price list"
    );
    Ok(result)
}

/// Returns the item array, or a description of what was found instead.
fn extract_items(value: Value) -> Result<Vec<Value>, &'static str> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err("an object whose `data` is not an array"),
            None => Err("an object without a `data` key"),
        },
        other => Err(json_type_name(&other)),
    }
}

#[cfg(test)]
mod tests {
    use pricesync_core::{ResponseFormat, StatusVocabulary};
    use serde_json::json;

    use super::*;

    fn supplier() -> Supplier {
        Supplier {
            name: "Supplier JSON Demo".to_owned(),
            endpoint: "https://okeconnect.example.com/harga/json".to_owned(),
            module_id: Some(1),
            format: ResponseFormat::Json,
            mapping: Some(FieldMapping {
                code: Some("kode".to_owned()),
                description: Some("keterangan".to_owned()),
                price: Some("price".to_owned()),
                status: Some("status".to_owned()),
            }),
            status_vocabulary: [("1", "1")].into_iter().collect::<StatusVocabulary>(),
            is_active: true,
            table_selector: None,
        }
    }

    fn parse(body: &str) -> Result<ParseResult, FetchError> {
        let s = supplier();
        let mapping = s.mapping.clone().unwrap();
        parse_json_body(&s, &mapping, body)
    }

    #[test]
    fn parses_data_envelope() {
        let body = json!({"data": [
            {"kode": "A1", "keterangan": "Token", "price": "10.000", "status": "1"}
        ]})
        .to_string();
        let result = parse(&body).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.products[0].code, "A1");
        assert_eq!(result.products[0].price, 10_000);
        assert_eq!(result.products[0].status, "1");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn parses_top_level_array_in_order() {
        let body = json!([
            {"kode": "A1", "price": "1"},
            {"kode": "A2", "price": "2"},
            {"kode": "A3", "price": "3"}
        ])
        .to_string();
        let result = parse(&body).unwrap();
        let codes: Vec<&str> = result.products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["A1", "A2", "A3"]);
    }

    #[test]
    fn bad_item_does_not_discard_siblings() {
        let body = json!({"data": [
            {"kode": "A1", "price": "1"},
            "garbage",
            {"kode": "A3", "price": "3"}
        ]})
        .to_string();
        let result = parse(&body).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].item_index, Some(1));
        assert_eq!(result.diagnostics[0].kind, ErrorKind::ItemParse);
    }

    #[test]
    fn empty_data_array_is_empty_result() {
        let result = parse(r#"{"data": []}"#).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn object_without_data_is_decoding_error() {
        let err = parse(r#"{"products": []}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decoding);
        assert!(matches!(err, FetchError::UnexpectedShape { .. }));
    }

    #[test]
    fn non_array_data_is_decoding_error() {
        let err = parse(r#"{"data": {"kode": "A1"}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decoding);
    }

    #[test]
    fn scalar_body_is_decoding_error() {
        let err = parse("42").unwrap_err();
        assert!(matches!(err, FetchError::UnexpectedShape { found: "number", .. }));
    }

    #[test]
    fn invalid_json_is_decoding_error() {
        let err = parse("<html>maintenance</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decoding);
        assert!(matches!(err, FetchError::Deserialize { .. }));
    }
}
