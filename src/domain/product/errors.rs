use bigdecimal::BigDecimal;

// ============================================================================
// Product Validation Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProductError {
    #[error("Product name cannot be empty")]
    EmptyName,

    #[error("Product price cannot be negative: {0}")]
    NegativePrice(BigDecimal),
}
