use actix_web::{web, HttpResponse};

use super::AppState;

/// GET /health - component report; 503 when any component is unhealthy
pub async fn health_handler(state: web::Data<AppState>) -> HttpResponse {
    let report = state.health.report().await;

    if report.status.is_unhealthy() {
        HttpResponse::ServiceUnavailable().json(report)
    } else {
        HttpResponse::Ok().json(report)
    }
}
