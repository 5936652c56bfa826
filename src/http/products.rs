use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::AppState;
use crate::application::ServiceError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/products", web::get().to(list_products))
        .route("/products/{id}", web::get().to(get_product));
}

async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let products = state.products.list_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

async fn get_product(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let product = state.products.get_product(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}
