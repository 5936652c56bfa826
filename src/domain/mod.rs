// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Aggregates and their invariants. Each aggregate has its own subdirectory
// with its errors and aggregate implementation. Nothing in here knows about
// storage or HTTP.
//
// ============================================================================

pub mod order;
pub mod product;
