use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{error, instrument};
use uuid::Uuid;

use super::dto::ProductRequest;
use super::repo::Product;
use crate::{
    auth::extractors::{ActiveUser, AdminUser},
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
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
pub async fn list_products(
    State(state): State<AppState>,
    ActiveUser(_user): ActiveUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Product>>, (StatusCode, String)> {
    let products = Product::list(&state.db, p.limit, p.offset)
        .await
        .map_err(internal)?;
    Ok(Json(products))
}

#[instrument(skip_all)]
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    Json(payload): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), (StatusCode, String)> {
    let product = Product::create(
        &state.db,
        &payload.name,
        &payload.description,
        payload.price,
        &payload.category,
    )
    .await
    .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip_all)]
pub async fn get_product(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, (StatusCode, String)> {
    match Product::get(&state.db, id).await.map_err(internal)? {
        Some(product) => Ok(Json(product)),
        None => Err((StatusCode::NOT_FOUND, "Product not found".into())),
    }
}

#[instrument(skip_all)]
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductRequest>,
) -> Result<Json<Product>, (StatusCode, String)> {
    let updated = Product::update(
        &state.db,
        id,
        &payload.name,
        &payload.description,
        payload.price,
        &payload.category,
    )
    .await
    .map_err(internal)?;
    match updated {
        Some(product) => Ok(Json(product)),
        None => Err((StatusCode::NOT_FOUND, "Product not found".into())),
    }
}

#[instrument(skip_all)]
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, (StatusCode, String)> {
    match Product::delete(&state.db, id).await.map_err(internal)? {
        Some(product) => Ok(Json(product)),
        None => Err((StatusCode::NOT_FOUND, "Product not found".into())),
    }
}
