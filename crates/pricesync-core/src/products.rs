use serde::{Deserialize, Serialize};

/// A supplier price-list entry normalized into the canonical shape every
/// supplier maps into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Supplier product code, e.g. `"PLN20"`.
    pub code: String,
    pub description: String,
    /// Price in the minor currency unit. Never negative; malformed input is
    /// stored as `0`.
    pub price: u64,
    /// Canonical status token: [`crate::ACTIVE_STATUS`] or
    /// [`crate::INACTIVE_STATUS`].
    pub status: String,
}

impl Product {
    /// Returns `true` if the product carries the active status token.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == crate::ACTIVE_STATUS
    }
}
