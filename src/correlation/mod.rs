// ============================================================================
// Correlation - request correlation id propagation
// ============================================================================
//
// context/    - CorrelationContext (per-request id holder) and RequestId
// middleware/ - CorrelationId transform resolving, logging and echoing the id,
//               plus the LogEnrichment fields of the request span
//
// ============================================================================

mod context;
mod middleware;

pub use context::{RequestId, CORRELATION_ID_HEADER};
pub use middleware::{CorrelationId, LogEnrichment};
