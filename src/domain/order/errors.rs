// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid order line quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Order line quantity overflow: {current} + {added}")]
    QuantityOverflow { current: i32, added: i32 },
}
