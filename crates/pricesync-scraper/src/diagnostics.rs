//! Structured diagnostic events handed to the observability collaborator.

use serde::Serialize;

use crate::error::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One `{supplier, item_index?, severity, message}` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub supplier: String,
    /// Position of the raw item in the payload, for item-level events.
    pub item_index: Option<usize>,
    pub severity: Severity,
    pub kind: ErrorKind,
    pub message: String,
}

impl Diagnostic {
    /// Item-level event. Always [`ErrorKind::ItemParse`].
    #[must_use]
    pub fn item(supplier: &str, item_index: usize, severity: Severity, message: String) -> Self {
        Self {
            supplier: supplier.to_owned(),
            item_index: Some(item_index),
            severity,
            kind: ErrorKind::ItemParse,
            message,
        }
    }

    #[must_use]
    pub fn supplier(supplier: &str, kind: ErrorKind, severity: Severity, message: String) -> Self {
        Self {
            supplier: supplier.to_owned(),
            item_index: None,
            severity,
            kind,
            message,
        }
    }

    /// Writes this event to the `tracing` subscriber.
    pub fn emit(&self) {
        let supplier = self.supplier.as_str();
        let item_index = self.item_index;
        match self.severity {
            Severity::Warning => {
                tracing::warn!(supplier, item_index, kind = %self.kind, "{}", self.message);
            }
            Severity::Error => {
                tracing::error!(supplier, item_index, kind = %self.kind, "{}", self.message);
            }
        }
    }
}
