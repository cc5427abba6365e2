use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tracing::instrument;

use crate::error::ApiError;
use crate::inventory::dto::{
    LowStockParams, MessageResponse, ProductInput, ProductResponse, StockAdjustment,
};
use crate::inventory::repo_types::Product;
use crate::inventory::services;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(add_product).get(list_products))
        .route("/products/low-stock", get(low_stock))
        .route("/products/:id", put(update_product).delete(delete_product))
        .route("/products/:id/stock/add", post(add_stock))
        .route("/products/:id/stock/deduct", post(deduct_stock))
}

#[instrument(skip(state, payload))]
async fn add_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductInput>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product = services::add_product(state.products.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            message: "Product added successfully".into(),
            product,
        }),
    ))
}

#[instrument(skip(state))]
async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = services::all_products(state.products.as_ref()).await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
async fn low_stock(
    State(state): State<AppState>,
    Query(params): Query<LowStockParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products =
        services::low_stock_products(state.products.as_ref(), params.threshold).await?;
    Ok(Json(products))
}

#[instrument(skip(state, payload))]
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductInput>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = services::update_product(state.products.as_ref(), id, payload).await?;
    Ok(Json(ProductResponse {
        message: "Product updated successfully".into(),
        product,
    }))
}

#[instrument(skip(state))]
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::delete_product(state.products.as_ref(), id).await?;
    Ok(Json(MessageResponse {
        message: "Product deleted successfully".into(),
    }))
}

#[instrument(skip(state, payload))]
async fn add_stock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockAdjustment>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = services::add_stock(state.products.as_ref(), id, payload.quantity).await?;
    Ok(Json(ProductResponse {
        message: "Stock added successfully".into(),
        product,
    }))
}

#[instrument(skip(state, payload))]
async fn deduct_stock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockAdjustment>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = services::deduct_stock(state.products.as_ref(), id, payload.quantity).await?;
    Ok(Json(ProductResponse {
        message: "Stock deducted successfully".into(),
        product,
    }))
}
