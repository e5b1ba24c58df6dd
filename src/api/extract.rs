use axum::extract::FromRequest;

use super::error::ApiError;

/// `Json<T>` whose rejections render as [`ApiError`] instead of plain text
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
