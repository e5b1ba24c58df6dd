use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use super::extract::ApiJson;
use super::response::ApiResponse;
use super::validation::{require_uuid, validate_quantity};
use crate::db::{Cart, CartItem, CartItemRequest, CartRepository, User, UserRepository};
use crate::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Only the owner (or an admin) may touch a cart
fn authorize_cart(user: &User, cart_id: &str) -> Result<(), ApiError> {
    require_uuid(cart_id, "cart id")?;
    if user.can_access_cart(cart_id) {
        Ok(())
    } else {
        Err(ApiError::forbidden("You do not have access to this cart"))
    }
}

fn check_quantity(quantity: i64) -> Result<(), ApiError> {
    validate_quantity(quantity).map_err(|e| ApiError::validation_field("quantity", e))
}

/// POST /api/v1/carts
///
/// Every cart belongs to exactly one user. A caller that already owns a cart
/// gets it back instead of a second one.
pub async fn create_cart(State(state): State<Arc<AppState>>, user: User) -> ApiResult<Cart> {
    let carts = CartRepository::new(&state.db);

    if let Some(cart_id) = user.cart_id.as_deref() {
        let cart = carts.get(cart_id).await?;
        return Ok(ApiResponse::json("Cart retrieved successfully", cart));
    }

    let cart = carts.create().await?;
    UserRepository::new(&state.db)
        .attach_cart(&user.id, &cart.id)
        .await?;
    info!(cart_id = %cart.id, user_id = %user.id, "Cart created");

    Ok(ApiResponse::json("Cart created successfully", cart))
}

/// GET /api/v1/carts/:cid
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    Path(cid): Path<String>,
    user: User,
) -> ApiResult<Cart> {
    authorize_cart(&user, &cid)?;
    let cart = CartRepository::new(&state.db).get(&cid).await?;
    Ok(ApiResponse::json("Cart retrieved successfully", cart))
}

/// DELETE /api/v1/carts/:cid
///
/// Empties the cart; the cart itself is kept.
pub async fn clear_cart(
    State(state): State<Arc<AppState>>,
    Path(cid): Path<String>,
    user: User,
) -> ApiResult<Vec<CartItem>> {
    authorize_cart(&user, &cid)?;
    let cart = CartRepository::new(&state.db).clear(&cid).await?;
    info!(cart_id = %cid, "Cart emptied");
    Ok(ApiResponse::json("Cart emptied successfully", cart.products))
}

/// POST /api/v1/carts/:cid/products/:pid
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path((cid, pid)): Path<(String, String)>,
    user: User,
    ApiJson(req): ApiJson<CartItemRequest>,
) -> ApiResult<Vec<CartItem>> {
    authorize_cart(&user, &cid)?;
    require_uuid(&pid, "product id")?;
    check_quantity(req.quantity)?;

    let cart = CartRepository::new(&state.db)
        .add_item(&cid, &pid, req.quantity)
        .await?;
    info!(cart_id = %cid, product_id = %pid, quantity = req.quantity, "Product added to cart");

    Ok(ApiResponse::json("Product added successfully", cart.products))
}

/// PUT /api/v1/carts/:cid/products/:pid
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path((cid, pid)): Path<(String, String)>,
    user: User,
    ApiJson(req): ApiJson<CartItemRequest>,
) -> ApiResult<Cart> {
    authorize_cart(&user, &cid)?;
    require_uuid(&pid, "product id")?;
    check_quantity(req.quantity)?;

    let cart = CartRepository::new(&state.db)
        .set_quantity(&cid, &pid, req.quantity)
        .await?;
    info!(cart_id = %cid, product_id = %pid, quantity = req.quantity, "Cart quantity updated");

    Ok(ApiResponse::json("Product quantity updated successfully", cart))
}

/// DELETE /api/v1/carts/:cid/products/:pid
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path((cid, pid)): Path<(String, String)>,
    user: User,
) -> ApiResult<Vec<CartItem>> {
    authorize_cart(&user, &cid)?;
    require_uuid(&pid, "product id")?;

    let cart = CartRepository::new(&state.db).remove_item(&cid, &pid).await?;
    info!(cart_id = %cid, product_id = %pid, "Product removed from cart");

    Ok(ApiResponse::json("Product deleted successfully", cart.products))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorCode;
    use crate::db::roles;

    fn user_with_cart(cart_id: Option<&str>, role: &str) -> User {
        User {
            id: "u-1".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "jdoe@gmail.com".to_string(),
            age: None,
            password_hash: String::new(),
            phone: None,
            role: role.to_string(),
            cart_id: cart_id.map(str::to_string),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_authorize_cart() {
        let own = "550e8400-e29b-41d4-a716-446655440000";
        let other = "6fa459ea-ee8a-3ca4-894e-db77e160355e";

        let user = user_with_cart(Some(own), roles::USER);
        assert!(authorize_cart(&user, own).is_ok());
        assert_eq!(
            authorize_cart(&user, other).unwrap_err().code(),
            ErrorCode::Forbidden
        );
        assert_eq!(
            authorize_cart(&user, "garbage").unwrap_err().code(),
            ErrorCode::BadRequest
        );

        let admin = user_with_cart(None, roles::ADMIN);
        assert!(authorize_cart(&admin, other).is_ok());
    }

    #[test]
    fn test_check_quantity() {
        assert!(check_quantity(1).is_ok());
        assert_eq!(check_quantity(0).unwrap_err().code(), ErrorCode::ValidationError);
    }
}
