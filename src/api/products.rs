use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

use super::auth::require_admin;
use super::error::ApiError;
use super::extract::ApiJson;
use super::response::ApiResponse;
use super::validation::{require_uuid, validate_create_product, validate_update_product};
use crate::db::{CreateProductRequest, Product, ProductRepository, UpdateProductRequest, User};
use crate::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Catalog writes are open unless `auth.admin_only_catalog` is set
fn check_catalog_write(state: &AppState, user: Option<&User>) -> Result<(), ApiError> {
    if !state.config.auth.admin_only_catalog {
        return Ok(());
    }
    match user {
        Some(user) => require_admin(user),
        None => Err(ApiError::unauthorized("Not logged in")),
    }
}

/// GET /api/v1/products
pub async fn list_products(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Product>> {
    let products = ProductRepository::new(&state.db).list().await?;
    Ok(ApiResponse::json("Products retrieved successfully", products))
}

/// GET /api/v1/products/:id
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    require_uuid(&id, "product id")?;
    let product = ProductRepository::new(&state.db).get(&id).await?;
    Ok(ApiResponse::json("Product retrieved successfully", product))
}

/// POST /api/v1/products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    user: Option<User>,
    ApiJson(req): ApiJson<CreateProductRequest>,
) -> ApiResult<Product> {
    check_catalog_write(&state, user.as_ref())?;
    validate_create_product(&req)?;

    let product = ProductRepository::new(&state.db).create(&req).await?;
    info!(product_id = %product.id, code = %product.code, "Product created");

    Ok(ApiResponse::json("Product added successfully", product))
}

/// PUT /api/v1/products/:id
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: Option<User>,
    ApiJson(req): ApiJson<UpdateProductRequest>,
) -> ApiResult<Product> {
    check_catalog_write(&state, user.as_ref())?;
    require_uuid(&id, "product id")?;
    validate_update_product(&req)?;

    let product = ProductRepository::new(&state.db).update(&id, &req).await?;
    info!(product_id = %id, "Product updated");

    Ok(ApiResponse::json("Product updated successfully", product))
}

/// DELETE /api/v1/products/:id
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: Option<User>,
) -> ApiResult<String> {
    check_catalog_write(&state, user.as_ref())?;
    require_uuid(&id, "product id")?;

    ProductRepository::new(&state.db).delete(&id).await?;
    info!(product_id = %id, "Product deleted");

    Ok(ApiResponse::json("Product deleted successfully", id))
}
