//! Success envelopes.

use axum::Json;
use serde::Serialize;

/// `{ "message": ..., "data": ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn json(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            message: message.into(),
            data,
        })
    }
}

/// Registration response, also exposing the user as `newUserUpdated`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse<T> {
    pub message: String,
    pub new_user_updated: T,
    pub data: T,
}

/// Current-session response, also exposing the user as `currentUser`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse<T> {
    pub message: String,
    pub current_user: T,
    pub data: T,
}
