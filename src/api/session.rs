//! Registration, login and the current-session endpoints.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::{info, warn};

use super::auth::{extract_token, removal_cookie, session_cookie};
use super::error::{ApiError, ValidationErrorBuilder};
use super::extract::ApiJson;
use super::response::{ApiResponse, CurrentUserResponse, RegisterResponse};
use super::validation::validate_registration;
use crate::crypto::verify_password;
use crate::db::{
    LoginRequest, NewUser, RegisterRequest, SessionRepository, User, UserRepository,
    UserResponse, UserWithCart,
};
use crate::AppState;

/// POST /api/v1/session/register
///
/// Creates the user together with an empty cart.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<RegisterResponse<UserResponse>>, ApiError> {
    let new_user = NewUser::from(req);
    validate_registration(&new_user)?;

    let user = UserRepository::new(&state.db)
        .create_with_cart(&new_user)
        .await?;
    info!(user_id = %user.id, email = %user.email, "User registered");

    let user = UserResponse::from(user);
    Ok(Json(RegisterResponse {
        message: "User added successfully".to_string(),
        new_user_updated: user.clone(),
        data: user,
    }))
}

/// POST /api/v1/session/login
///
/// Sets the `cookieToken` cookie on success.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<UserResponse>>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if req.email.trim().is_empty() {
        errors.add("email", "Email is required");
    }
    if req.password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors.finish()?;

    let email = req.email.trim().to_lowercase();
    let user = UserRepository::new(&state.db).find_by_email(&email).await?;

    let user = match user {
        Some(user) if verify_password(&req.password, &user.password_hash) => user,
        _ => {
            warn!(email = %email, "Failed login attempt");
            return Err(ApiError::unauthorized("Invalid credentials"));
        }
    };

    let ttl = chrono::Duration::try_hours(state.config.auth.session_ttl_hours)
        .ok_or_else(|| ApiError::internal("Invalid session lifetime"))?;
    let token = SessionRepository::new(&state.db).create(&user.id, ttl).await?;
    info!(user_id = %user.id, "User logged in");

    let jar = jar.add(session_cookie(token, &state.config.auth));
    Ok((
        jar,
        ApiResponse::json("Login successful", UserResponse::from(user)),
    ))
}

/// POST /api/v1/session/logout
///
/// Always succeeds; revokes the presented session if there is one.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<Option<String>>>), ApiError> {
    if let Some(token) = extract_token(&headers) {
        if SessionRepository::new(&state.db).revoke(&token).await? {
            info!("Session revoked");
        }
    }

    Ok((
        jar.remove(removal_cookie()),
        ApiResponse::json("Logout successful", None),
    ))
}

/// GET /api/v1/session/current
pub async fn current(user: User) -> Json<CurrentUserResponse<UserResponse>> {
    let user = UserResponse::from(user);
    Json(CurrentUserResponse {
        message: "Current user retrieved successfully".to_string(),
        current_user: user.clone(),
        data: user,
    })
}

/// GET /api/v1/session/user
///
/// The logged-in user with their cart resolved.
pub async fn current_with_cart(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<ApiResponse<UserWithCart>>, ApiError> {
    let user = UserRepository::new(&state.db).get_with_cart(&user.id).await?;
    Ok(ApiResponse::json("User retrieved successfully", user))
}

/// DELETE /api/v1/session/user/:id
///
/// Users may delete themselves; admins may delete anyone.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: User,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<String>>), ApiError> {
    let is_self = user.id == id;
    if !is_self && !user.is_admin() {
        return Err(ApiError::forbidden("You can only delete your own account"));
    }

    UserRepository::new(&state.db).delete(&id).await?;
    info!(user_id = %id, deleted_by = %user.id, "User deleted");

    // Our own session went with the account
    let jar = if is_self { jar.remove(removal_cookie()) } else { jar };
    Ok((jar, ApiResponse::json("User deleted successfully", id)))
}
