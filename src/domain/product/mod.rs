// ============================================================================
// Product Domain - Catalog entries referenced by order lines
// ============================================================================

pub mod errors;
pub mod aggregate;

pub use aggregate::*;
