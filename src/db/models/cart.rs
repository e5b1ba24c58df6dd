//! Cart models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::product::Product;

/// Largest quantity a single cart line may hold
pub const MAX_QUANTITY: i64 = 10_000;

#[derive(Debug, Clone, FromRow)]
pub struct CartRow {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A cart with its line items resolved to full products, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub products: Vec<CartItem>,
    pub created_at: String,
    pub updated_at: String,
}

impl Cart {
    pub fn from_parts(row: CartRow, products: Vec<CartItem>) -> Self {
        Self {
            id: row.id,
            products,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: i64,
}

/// Joined `cart_items` + `products` row
#[derive(Debug, Clone, FromRow)]
pub struct CartLineRow {
    pub quantity: i64,
    pub product_id: String,
    pub title: String,
    pub description: String,
    pub code: String,
    pub price: f64,
    pub status: bool,
    pub stock: i64,
    pub category: String,
    pub thumbnail: Option<String>,
    pub product_created_at: String,
    pub product_updated_at: String,
}

impl From<CartLineRow> for CartItem {
    fn from(row: CartLineRow) -> Self {
        Self {
            quantity: row.quantity,
            product: Product {
                id: row.product_id,
                title: row.title,
                description: row.description,
                code: row.code,
                price: row.price,
                status: row.status,
                stock: row.stock,
                category: row.category,
                thumbnail: row.thumbnail,
                created_at: row.product_created_at,
                updated_at: row.product_updated_at,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}
