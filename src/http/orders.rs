use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::AppState;
use crate::application::{CreateOrderDto, ServiceError};
use crate::domain::order::LineItem;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/orders")
            .name("orders")
            .route(web::post().to(create_order))
            .route(web::get().to(list_orders)),
    )
    .service(
        web::resource("/orders/{id}")
            .name("order")
            .route(web::get().to(get_order))
            .route(web::put().to(update_order))
            .route(web::delete().to(delete_order)),
    );
}

async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderDto>,
) -> Result<HttpResponse, ServiceError> {
    let order = state.orders.create_order(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn list_orders(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let orders = state.orders.list_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

async fn get_order(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let order = state.orders.get_order(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn update_order(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<Vec<LineItem>>,
) -> Result<HttpResponse, ServiceError> {
    let order = state
        .orders
        .update_order(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn delete_order(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    state.orders.delete_order(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
