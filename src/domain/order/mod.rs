// ============================================================================
// Order Domain - Order aggregate and its owned lines
// ============================================================================
//
// - Value objects (LineItem)
// - Errors (OrderError)
// - Aggregate (Order, OrderLine)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod aggregate;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
pub use aggregate::*;
