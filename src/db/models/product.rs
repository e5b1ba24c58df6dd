//! Catalog product models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,
    /// SKU, unique across the catalog
    pub code: String,
    pub price: f64,
    /// Availability flag
    pub status: bool,
    pub stock: i64,
    pub category: String,
    pub thumbnail: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code: String,
    pub price: Option<f64>,
    #[serde(default = "default_status")]
    pub status: bool,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category: String,
    pub thumbnail: Option<String>,
}

fn default_status() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub price: Option<f64>,
    pub status: Option<bool>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub thumbnail: Option<String>,
}
