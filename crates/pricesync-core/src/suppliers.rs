//! Supplier definitions: endpoint, response format, field mapping and status
//! vocabulary, plus loading and validation of the suppliers YAML file.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Canonical status token for a product that can be sold.
pub const ACTIVE_STATUS: &str = "1";
/// Canonical status token for a product that is disabled or failing upstream.
pub const INACTIVE_STATUS: &str = "0";

/// The fixed target vocabulary every supplier maps into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Code,
    Description,
    Price,
    Status,
}

impl CanonicalField {
    /// All canonical fields in extraction order.
    pub const ALL: [CanonicalField; 4] = [
        CanonicalField::Code,
        CanonicalField::Description,
        CanonicalField::Price,
        CanonicalField::Status,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::Code => "code",
            CanonicalField::Description => "description",
            CanonicalField::Price => "price",
            CanonicalField::Status => "status",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical field → source field name.
///
/// Unknown keys are rejected when the suppliers file is parsed, so a
/// mapping that reaches a fetch only ever names canonical fields. The
/// legacy keys `kode`, `deskripsi` and `harga` are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMapping {
    #[serde(default, alias = "kode")]
    pub code: Option<String>,
    #[serde(default, alias = "deskripsi")]
    pub description: Option<String>,
    #[serde(default, alias = "harga")]
    pub price: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl FieldMapping {
    /// A mapping where every canonical field reads the source key of the
    /// same name.
    #[must_use]
    pub fn canonical() -> Self {
        let own = |field: CanonicalField| Some(field.as_str().to_owned());
        Self {
            code: own(CanonicalField::Code),
            description: own(CanonicalField::Description),
            price: own(CanonicalField::Price),
            status: own(CanonicalField::Status),
        }
    }

    /// Source field name configured for `field`, if any.
    #[must_use]
    pub fn source_for(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::Code => self.code.as_deref(),
            CanonicalField::Description => self.description.as_deref(),
            CanonicalField::Price => self.price.as_deref(),
            CanonicalField::Status => self.status.as_deref(),
        }
    }
}

/// Source status token → canonical status token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusVocabulary(BTreeMap<String, String>);

impl StatusVocabulary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Normalizes a raw status token to [`ACTIVE_STATUS`] or
    /// [`INACTIVE_STATUS`].
    ///
    /// The raw token is lower-cased before lookup. Tokens missing from the
    /// vocabulary, and every token when the vocabulary is empty, map to
    /// [`INACTIVE_STATUS`].
    #[must_use]
    pub fn normalize(&self, raw: &str) -> &'static str {
        match self.0.get(&raw.to_lowercase()).map(String::as_str) {
            Some(ACTIVE_STATUS) => ACTIVE_STATUS,
            _ => INACTIVE_STATUS,
        }
    }

    /// Entries whose target is neither [`ACTIVE_STATUS`] nor
    /// [`INACTIVE_STATUS`]. They load, but always normalize to inactive.
    pub fn non_canonical_targets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .filter(|(_, v)| *v != ACTIVE_STATUS && *v != INACTIVE_STATUS)
    }
}

impl<K, V> FromIterator<(K, V)> for StatusVocabulary
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Response format tag of a supplier endpoint.
///
/// Tags are matched case-insensitively. An unrecognised tag is kept as
/// [`ResponseFormat::Unsupported`] so that it fails for that supplier alone
/// when a fetch is dispatched, rather than rejecting the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResponseFormat {
    Json,
    Html,
    Unsupported(String),
}

impl From<String> for ResponseFormat {
    fn from(tag: String) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "json" => ResponseFormat::Json,
            "html" => ResponseFormat::Html,
            _ => ResponseFormat::Unsupported(tag),
        }
    }
}

impl From<ResponseFormat> for String {
    fn from(format: ResponseFormat) -> Self {
        format.to_string()
    }
}

impl std::fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseFormat::Json => f.write_str("json"),
            ResponseFormat::Html => f.write_str("html"),
            ResponseFormat::Unsupported(tag) => f.write_str(tag),
        }
    }
}

fn default_active() -> bool {
    true
}

/// One external price-list source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Supplier {
    pub name: String,
    #[serde(alias = "url_harga")]
    pub endpoint: String,
    /// Downstream billing module fed by this supplier's prices.
    #[serde(default, alias = "id_oto_modul")]
    pub module_id: Option<i64>,
    #[serde(alias = "web_response_type")]
    pub format: ResponseFormat,
    /// Absent mapping is valid but degraded: JSON suppliers yield no products.
    #[serde(default)]
    pub mapping: Option<FieldMapping>,
    #[serde(default, alias = "status_mapping")]
    pub status_vocabulary: StatusVocabulary,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// CSS selector for the price table rows of an HTML supplier.
    #[serde(default)]
    pub table_selector: Option<String>,
}

impl Supplier {
    /// File-name-safe identifier derived from the supplier name, e.g.
    /// `"Supplier JSON Demo"` → `"supplier_json_demo"`.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' || c == '_' {
                    '_'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('_')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("_")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuppliersFile {
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
}

impl SuppliersFile {
    /// Suppliers with `is_active: true`, in file order.
    pub fn active(&self) -> impl Iterator<Item = &Supplier> {
        self.suppliers.iter().filter(|s| s.is_active)
    }

    /// Looks up a supplier by name, ignoring case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Supplier> {
        let wanted = name.trim().to_lowercase();
        self.suppliers
            .iter()
            .find(|s| s.name.to_lowercase() == wanted)
    }
}

/// Load and validate the suppliers configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_suppliers(path: &Path) -> Result<SuppliersFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SuppliersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_suppliers(&content)
}

/// Parse and validate suppliers YAML already in memory.
///
/// # Errors
///
/// Returns [`ConfigError::SuppliersFileParse`] for malformed YAML or unknown
/// mapping keys, and [`ConfigError::Validation`] for semantic violations.
pub fn parse_suppliers(content: &str) -> Result<SuppliersFile, ConfigError> {
    let suppliers_file: SuppliersFile = serde_yaml::from_str(content)?;
    validate_suppliers(&suppliers_file)?;
    Ok(suppliers_file)
}

fn validate_suppliers(suppliers_file: &SuppliersFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for supplier in &suppliers_file.suppliers {
        if supplier.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "supplier name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(supplier.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate supplier name: '{}'",
                supplier.name
            )));
        }

        let slug = supplier.slug();
        if slug.is_empty() || !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate or empty supplier slug: '{}' (from supplier '{}')",
                slug, supplier.name
            )));
        }

        let endpoint = supplier.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "supplier '{}' has endpoint '{}'; must be an http(s) URL",
                supplier.name, supplier.endpoint
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "suppliers_test.rs"]
mod tests;
