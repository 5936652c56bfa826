use actix_web::{web, HttpResponse};
use prometheus::{Encoder, TextEncoder};

use crate::http::AppState;

/// GET /metrics - Prometheus text exposition of the application registry
pub async fn metrics_handler(state: web::Data<AppState>) -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
