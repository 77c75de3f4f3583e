use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{error, instrument};
use uuid::Uuid;

use super::dto::{OrderItemRequest, OrderRequest};
use super::repo::{Order, OrderItem};
use crate::{
    auth::extractors::{ActiveUser, AdminUser},
    state::AppState,
};

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/customer/:customer_id", get(list_customer_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", get(get_order_status))
        .route("/orders/:id/items", post(create_order_item))
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    100
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "database error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip_all)]
pub async fn create_order(
    State(state): State<AppState>,
    ActiveUser(_user): ActiveUser,
    Json(payload): Json<OrderRequest>,
) -> Result<(StatusCode, Json<Order>), (StatusCode, String)> {
    let order = Order::create(
        &state.db,
        payload.customer_id,
        payload.order_date,
        &payload.status,
    )
    .await
    .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[instrument(skip_all)]
pub async fn list_orders(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Order>>, (StatusCode, String)> {
    let orders = Order::list(&state.db, p.limit, p.offset)
        .await
        .map_err(internal)?;
    Ok(Json(orders))
}

#[instrument(skip_all)]
pub async fn get_order(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, (StatusCode, String)> {
    match Order::get(&state.db, id).await.map_err(internal)? {
        Some(order) => Ok(Json(order)),
        None => Err((StatusCode::NOT_FOUND, "Order not found".into())),
    }
}

#[instrument(skip_all)]
pub async fn get_order_status(
    State(state): State<AppState>,
    ActiveUser(_user): ActiveUser,
    Path(id): Path<Uuid>,
) -> Result<Json<String>, (StatusCode, String)> {
    match Order::get(&state.db, id).await.map_err(internal)? {
        Some(order) => Ok(Json(order.status)),
        None => Err((StatusCode::NOT_FOUND, "Order not found".into())),
    }
}

#[instrument(skip_all)]
pub async fn list_customer_orders(
    State(state): State<AppState>,
    ActiveUser(_user): ActiveUser,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, (StatusCode, String)> {
    let orders = Order::list_by_customer(&state.db, customer_id)
        .await
        .map_err(internal)?;
    Ok(Json(orders))
}

#[instrument(skip_all)]
pub async fn create_order_item(
    State(state): State<AppState>,
    ActiveUser(_user): ActiveUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<OrderItemRequest>,
) -> Result<(StatusCode, Json<OrderItem>), (StatusCode, String)> {
    // The order must exist before items can be attached.
    if Order::get(&state.db, id).await.map_err(internal)?.is_none() {
        return Err((StatusCode::NOT_FOUND, "Order not found".into()));
    }
    let item = OrderItem::create(&state.db, id, payload.product_id, payload.quantity)
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(item)))
}
