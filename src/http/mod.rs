use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use std::sync::Arc;
use std::time::Instant;

use crate::application::{OrderService, ProductService};
use crate::correlation::{CorrelationId, LogEnrichment};
use crate::health::HealthChecker;
use crate::metrics::{metrics_handler, Metrics};
use crate::store::Repositories;

mod health;
mod orders;
mod problem;
mod products;

use problem::problem_details;

// ============================================================================
// HTTP Layer - actix-web application
// ============================================================================
//
// Middleware order, outermost first:
// 1. CorrelationId    - resolves the id, opens the request span, echoes header
// 2. request metrics  - counts requests by route pattern and final status
// 3. problem details  - rewrites error responses as RFC 7807 bodies
//
// ============================================================================

pub struct AppState {
    pub orders: OrderService,
    pub products: ProductService,
    pub health: HealthChecker,
    pub metrics: Arc<Metrics>,
    pub log_enrichment: LogEnrichment,
}

impl AppState {
    pub fn new(repositories: Repositories, metrics: Arc<Metrics>) -> Self {
        Self {
            orders: OrderService::new(repositories.orders, metrics.clone()),
            products: ProductService::new(repositories.products),
            health: HealthChecker::new().with_check(repositories.health),
            metrics,
            log_enrichment: LogEnrichment::default(),
        }
    }

    pub fn with_log_enrichment(mut self, log_enrichment: LogEnrichment) -> Self {
        self.log_enrichment = log_enrichment;
        self
    }
}

async fn route_not_found() -> actix_web::Result<actix_web::HttpResponse> {
    Err(actix_web::error::ErrorNotFound("No route matches the request"))
}

pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let correlation = CorrelationId::new(state.log_enrichment.clone());

    App::new()
        .app_data(state)
        .wrap(problem_details())
        .wrap_fn(|req, srv| {
            let started = Instant::now();
            let method = req.method().to_string();
            let metrics = req
                .app_data::<web::Data<AppState>>()
                .map(|state| state.metrics.clone());
            let fut = srv.call(req);

            async move {
                let res = fut.await?;
                if let Some(metrics) = metrics {
                    let route = res
                        .request()
                        .match_pattern()
                        .unwrap_or_else(|| "unmatched".to_string());
                    let status = res.status().as_u16();
                    metrics.record_request(&method, &route, status, started.elapsed());
                }
                Ok::<_, actix_web::Error>(res)
            }
        })
        .wrap(correlation)
        .configure(orders::configure)
        .configure(products::configure)
        .route("/health", web::get().to(health::health_handler))
        .route("/metrics", web::get().to(metrics_handler))
        .default_service(web::to(route_not_found))
}
