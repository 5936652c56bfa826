use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError};
use serde::Serialize;

use crate::application::ServiceError;
use crate::correlation::RequestId;

// ============================================================================
// Problem Details - RFC 7807 error responses
// ============================================================================
//
// Every response that carries an error passes through `render_problem`:
// - a recognized `ServiceError` keeps its status and exposes its code as
//   `detail`
// - anything else keeps its status and exposes no detail
//
// `traceId` is the request's RequestId, the value the `http_request` span
// records as `request_id`.
//
// ============================================================================

pub const PROBLEM_JSON: &str = "application/problem+json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub trace_id: String,
}

impl ProblemDetails {
    pub fn new(status: StatusCode, detail: Option<String>, trace_id: String) -> Self {
        Self {
            kind: problem_type(status),
            title: status
                .canonical_reason()
                .unwrap_or("An error occurred while processing your request.")
                .to_string(),
            status: status.as_u16(),
            detail,
            trace_id,
        }
    }
}

fn problem_type(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "https://tools.ietf.org/html/rfc9110#section-15.5.1",
        401 => "https://tools.ietf.org/html/rfc9110#section-15.5.2",
        403 => "https://tools.ietf.org/html/rfc9110#section-15.5.4",
        404 => "https://tools.ietf.org/html/rfc9110#section-15.5.5",
        405 => "https://tools.ietf.org/html/rfc9110#section-15.5.6",
        409 => "https://tools.ietf.org/html/rfc9110#section-15.5.10",
        415 => "https://tools.ietf.org/html/rfc9110#section-15.5.16",
        422 => "https://tools.ietf.org/html/rfc4918#section-11.2",
        500 => "https://tools.ietf.org/html/rfc9110#section-15.6.1",
        503 => "https://tools.ietf.org/html/rfc9110#section-15.6.4",
        _ => "about:blank",
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }
}

fn trace_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .copied()
        .unwrap_or_default()
        .to_string()
}

/// Middleware turning every error response into a problem response.
pub fn problem_details<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().default_handler(render_problem)
}

fn render_problem<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let status = res.status();
    let Some(error) = res.response().error() else {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    };

    let detail = error
        .as_error::<ServiceError>()
        .and_then(ServiceError::code)
        .map(str::to_owned);

    let trace_id = trace_id(res.request());
    if status.is_server_error() {
        tracing::error!(error = %error, status = status.as_u16(), %trace_id, "Unhandled error");
    } else {
        tracing::debug!(error = %error, status = status.as_u16(), %trace_id, "Request failed");
    }

    let problem = ProblemDetails::new(status, detail, trace_id);
    let (req, _) = res.into_parts();
    let response = HttpResponse::build(status)
        .content_type(PROBLEM_JSON)
        .json(problem);

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::codes;
    use crate::correlation::CorrelationId;
    use crate::store::StoreError;
    use actix_web::test as actix_test;
    use actix_web::{web, App};
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::span;
    use tracing_subscriber::layer::{Context, Layer};
    use tracing_subscriber::prelude::*;

    async fn conflict() -> Result<HttpResponse, ServiceError> {
        Err(ServiceError::Conflict(codes::ORDER_WITH_SAME_REFERENCE_ALREADY_EXISTS))
    }

    async fn storage_failure() -> Result<HttpResponse, ServiceError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut).into())
    }

    async fn framework_error() -> Result<HttpResponse, actix_web::Error> {
        Err(actix_web::error::ErrorBadRequest("secret parser internals"))
    }

    async fn plain_not_found() -> HttpResponse {
        HttpResponse::NotFound().body("no error attached")
    }

    macro_rules! app {
        () => {
            actix_test::init_service(
                App::new()
                    .wrap(problem_details())
                    .route("/conflict", web::get().to(conflict))
                    .route("/storage", web::get().to(storage_failure))
                    .route("/framework", web::get().to(framework_error))
                    .route("/plain", web::get().to(plain_not_found)),
            )
            .await
        };
    }

    /// Collects the `request_id` field of every span opened while installed.
    #[derive(Clone, Default)]
    struct RequestIdRecorder(Arc<Mutex<Vec<String>>>);

    struct RequestIdVisitor(Option<String>);

    impl Visit for RequestIdVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "request_id" {
                self.0 = Some(format!("{value:?}"));
            }
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for RequestIdRecorder {
        fn on_new_span(&self, attrs: &span::Attributes<'_>, _: &span::Id, _: Context<'_, S>) {
            let mut visitor = RequestIdVisitor(None);
            attrs.record(&mut visitor);
            if let Some(id) = visitor.0 {
                self.0.lock().unwrap().push(id);
            }
        }
    }

    #[actix_web::test]
    async fn test_domain_error_becomes_problem_with_code() {
        let app = app!();
        let req = actix_test::TestRequest::get().uri("/conflict").to_request();

        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            res.headers().get("content-type").unwrap(),
            "application/problem+json"
        );
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["status"], 403);
        assert_eq!(body["title"], "Forbidden");
        assert_eq!(body["type"], "https://tools.ietf.org/html/rfc9110#section-15.5.4");
        assert_eq!(body["detail"], "OrderWithSameReferenceAlreadyExists");
        assert!(!body["traceId"].as_str().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_storage_failure_hides_detail() {
        let app = app!();
        let req = actix_test::TestRequest::get().uri("/storage").to_request();

        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["status"], 500);
        assert!(body.get("detail").is_none());
        assert!(body["traceId"].is_string());
    }

    #[actix_web::test]
    async fn test_unrecognized_error_is_generic() {
        let app = app!();
        let req = actix_test::TestRequest::get().uri("/framework").to_request();

        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["title"], "Bad Request");
        assert!(body.get("detail").is_none());
        assert!(!body.to_string().contains("secret parser internals"));
    }

    #[actix_web::test]
    async fn test_responses_without_error_are_untouched() {
        let app = app!();
        let req = actix_test::TestRequest::get().uri("/plain").to_request();

        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = actix_test::read_body(res).await;
        assert_eq!(body, "no error attached".as_bytes());
    }

    #[actix_web::test]
    async fn test_trace_id_is_request_id() {
        let req = actix_test::TestRequest::default().to_http_request();
        let request_id = RequestId::new();
        req.extensions_mut().insert(request_id);

        assert_eq!(trace_id(&req), request_id.to_string());
    }

    // With a subscriber installed, every traceId must be the request_id the
    // request span was logged with.
    #[actix_web::test]
    async fn test_trace_id_matches_logged_request_id() {
        let recorder = RequestIdRecorder::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(recorder.clone()));
        let app = actix_test::init_service(
            App::new()
                .wrap(problem_details())
                .wrap(CorrelationId::default())
                .route("/conflict", web::get().to(conflict)),
        )
        .await;

        let mut trace_ids = Vec::new();
        for _ in 0..3 {
            let req = actix_test::TestRequest::get().uri("/conflict").to_request();
            let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
            trace_ids.push(body["traceId"].as_str().unwrap().to_owned());
        }

        let logged = recorder.0.lock().unwrap().clone();
        assert_eq!(trace_ids, logged);
        assert!(trace_ids.iter().all(|id| uuid::Uuid::parse_str(id).is_ok()));
    }

    #[test]
    fn test_problem_type_links() {
        assert_eq!(
            problem_type(StatusCode::NOT_FOUND),
            "https://tools.ietf.org/html/rfc9110#section-15.5.5"
        );
        assert_eq!(problem_type(StatusCode::IM_A_TEAPOT), "about:blank");
    }
}
