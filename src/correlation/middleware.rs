use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;
use std::time::Instant;
use tracing::field;
use tracing::Instrument;

use super::context::{CorrelationContext, RequestId, CORRELATION_ID_HEADER};

// ============================================================================
// Correlation Id Middleware
// ============================================================================
//
// For every request:
// 1. Resolve the correlation id: the inbound X-Correlation-Id header when it
//    is present and non-empty, otherwise the context's generated id.
// 2. Store the context and a fresh RequestId in the request extensions.
// 3. Run the downstream service inside an `http_request` span carrying the
//    correlation id, the request id and the service identity, so every log
//    event of the request is enriched with them.
// 4. Echo the id on the response unless downstream code already set the
//    header. An inbound header is echoed byte for byte.
//
// Downstream errors are propagated untouched.
//
// ============================================================================

/// Fields attached to every request span besides the ids.
#[derive(Debug, Clone, Default)]
pub struct LogEnrichment {
    pub environment: String,
    pub machine_name: String,
}

#[derive(Clone, Default)]
pub struct CorrelationId {
    enrichment: Arc<LogEnrichment>,
}

impl CorrelationId {
    pub fn new(enrichment: LogEnrichment) -> Self {
        Self {
            enrichment: Arc::new(enrichment),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CorrelationId
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = CorrelationIdMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorrelationIdMiddleware {
            service,
            enrichment: self.enrichment.clone(),
        }))
    }
}

pub struct CorrelationIdMiddleware<S> {
    service: S,
    enrichment: Arc<LogEnrichment>,
}

/// Inbound correlation id, if the caller sent a non-empty one.
fn inbound_correlation_id(headers: &HeaderMap) -> Option<HeaderValue> {
    headers
        .get(CORRELATION_ID_HEADER)
        .filter(|value| !value.is_empty())
        .cloned()
}

impl<S, B> Service<ServiceRequest> for CorrelationIdMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let inbound = inbound_correlation_id(req.headers());

        let mut context = CorrelationContext::new();
        if let Some(value) = &inbound {
            // Non-UTF-8 bytes are replaced in the context and logs only
            context.set(String::from_utf8_lossy(value.as_bytes()));
        }

        let correlation_id = context.get().to_owned();
        let request_id = RequestId::new();

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            request_id = %request_id,
            method = %req.method(),
            path = %req.path(),
            environment = field::Empty,
            machine_name = field::Empty,
        );
        if !self.enrichment.environment.is_empty() {
            span.record("environment", self.enrichment.environment.as_str());
        }
        if !self.enrichment.machine_name.is_empty() {
            span.record("machine_name", self.enrichment.machine_name.as_str());
        }

        req.extensions_mut().insert(context);
        req.extensions_mut().insert(request_id);

        let started = Instant::now();
        let fut = {
            let _entered = span.enter();
            self.service.call(req)
        };

        Box::pin(
            async move {
                let mut res = fut.await?;

                let header = HeaderName::from_static("x-correlation-id");
                if !res.headers().contains_key(&header) {
                    match inbound.map_or_else(|| HeaderValue::from_str(&correlation_id), Ok) {
                        Ok(value) => {
                            res.headers_mut().insert(header, value);
                        }
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                "Correlation id is not a valid header value"
                            );
                        }
                    }
                }

                tracing::info!(
                    status = res.status().as_u16(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Request completed"
                );

                Ok(res)
            }
            .instrument(span),
        )
    }
}
