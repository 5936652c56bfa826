use actix_web::http::StatusCode;

use crate::domain::order::OrderError;
use crate::store::StoreError;

// ============================================================================
// Service Errors - What the boundary layer sees
// ============================================================================
//
// Recognized errors carry a stable error code and an HTTP status. Storage
// failures are unclassified: they map to 500 and their details never leave
// the process.
//
// ============================================================================

pub mod codes {
    pub const ORDER_NOT_FOUND: &str = "OrderNotFound";
    pub const ORDER_WITH_SAME_REFERENCE_ALREADY_EXISTS: &str = "OrderWithSameReferenceAlreadyExists";
    pub const INVALID_ORDER_LINE_QUANTITY: &str = "InvalidOrderLineQuantity";
    pub const PRODUCT_NOT_FOUND: &str = "ProductNotFound";
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{code}: {source}")]
    Validation {
        code: &'static str,
        #[source]
        source: OrderError,
    },

    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl ServiceError {
    /// Error code exposed to clients; `None` for unclassified failures.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            ServiceError::NotFound(code) | ServiceError::Conflict(code) => Some(*code),
            ServiceError::Validation { code, .. } => Some(*code),
            ServiceError::Storage(_) => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            // Duplicate references are reported as 403, not 409.
            ServiceError::Conflict(_) => StatusCode::FORBIDDEN,
            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OrderError> for ServiceError {
    fn from(source: OrderError) -> Self {
        ServiceError::Validation {
            code: codes::INVALID_ORDER_LINE_QUANTITY,
            source,
        }
    }
}
