use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use std::fmt;
use uuid::Uuid;

/// Request/response header carrying the correlation id.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

// ============================================================================
// Correlation Context - per-request correlation id holder
// ============================================================================
//
// One instance per inbound request. It starts with a fresh time-ordered id
// and is overwritten when the caller supplied one. The middleware stores it
// in the request extensions; handlers can take it as an extractor.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationContext {
    correlation_id: String,
}

impl CorrelationContext {
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::now_v7().to_string(),
        }
    }

    pub fn get(&self) -> &str {
        &self.correlation_id
    }

    pub fn set(&mut self, correlation_id: impl Into<String>) {
        self.correlation_id = correlation_id.into();
    }
}

impl Default for CorrelationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FromRequest for CorrelationContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let context = req
            .extensions()
            .get::<CorrelationContext>()
            .cloned()
            .unwrap_or_default();
        ready(Ok(context))
    }
}

/// Server-generated identifier of a single request. Unlike the correlation
/// id it is never taken from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_new_context_holds_time_ordered_id() {
        let context = CorrelationContext::new();
        let parsed = Uuid::parse_str(context.get()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }

    #[test]
    fn test_contexts_do_not_share_ids() {
        assert_ne!(CorrelationContext::new(), CorrelationContext::new());
    }

    #[test]
    fn test_set_overwrites_generated_id() {
        let mut context = CorrelationContext::new();
        context.set("caller-supplied-42");
        assert_eq!(context.get(), "caller-supplied-42");
    }

    #[actix_web::test]
    async fn test_extractor_reads_request_extensions() {
        let req = TestRequest::default().to_http_request();
        let mut stored = CorrelationContext::new();
        stored.set("from-middleware");
        req.extensions_mut().insert(stored);

        let extracted = CorrelationContext::extract(&req).await.unwrap();
        assert_eq!(extracted.get(), "from-middleware");
    }

    #[actix_web::test]
    async fn test_extractor_without_middleware_generates_id() {
        let req = TestRequest::default().to_http_request();
        let extracted = CorrelationContext::extract(&req).await.unwrap();
        assert!(Uuid::parse_str(extracted.get()).is_ok());
    }

    #[test]
    fn test_request_id_display_is_uuid() {
        let id = RequestId::new();
        assert!(Uuid::parse_str(&id.to_string()).is_ok());
    }
}
