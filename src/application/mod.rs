// ============================================================================
// Application Layer - Services over the repositories
// ============================================================================
//
// Services translate storage outcomes into `ServiceError`s with stable error
// codes. They know nothing about HTTP beyond the status each error maps to.
//
// ============================================================================

pub mod dto;
pub mod errors;
mod order_service;
mod product_service;

pub use dto::CreateOrderDto;
pub use errors::ServiceError;
pub use order_service::OrderService;
pub use product_service::ProductService;
