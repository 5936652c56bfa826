use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Requested order line: which product and how many.
///
/// This is the shape callers hand to the order factory and to line
/// replacement; identities are assigned by the aggregate.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl LineItem {
    pub fn new(product_id: Uuid, quantity: i32) -> Self {
        Self { product_id, quantity }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
