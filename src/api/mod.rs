pub mod auth;
mod carts;
pub mod error;
pub mod extract;
mod products;
pub mod rate_limit;
pub mod response;
mod session;
pub mod validation;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Session routes get the stricter auth tier
    let session_routes = Router::new()
        .route("/register", post(session::register))
        .route("/login", post(session::login))
        .route("/logout", post(session::logout))
        .route("/current", get(session::current))
        .route("/user", get(session::current_with_cart))
        .route("/user/:id", delete(session::delete_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_auth,
        ));

    let product_routes = Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        );

    let cart_routes = Router::new()
        .route("/", post(carts::create_cart))
        .route("/:cid", get(carts::get_cart).delete(carts::clear_cart))
        .route(
            "/:cid/products/:pid",
            post(carts::add_item)
                .put(carts::update_item)
                .delete(carts::remove_item),
        );

    let api_routes = Router::new()
        .nest("/products", product_routes)
        .nest("/carts", cart_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_api,
        ))
        .nest("/session", session_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
