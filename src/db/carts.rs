//! Cart repository.
//!
//! Every line mutation is keyed by `(cart_id, product_id)` so touching one
//! product never disturbs the other lines of the cart.

use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{Cart, CartItem, CartLineRow, CartRow, MAX_QUANTITY};
use super::{now, RepositoryError};

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an empty cart.
    pub async fn create(&self) -> Result<Cart, RepositoryError> {
        let id = Uuid::new_v4().to_string();
        let now = now();

        sqlx::query("INSERT INTO carts (id, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(&now)
            .bind(&now)
            .execute(self.pool)
            .await?;

        Ok(Cart {
            id,
            products: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Load a cart with its lines resolved to full products.
    pub async fn get(&self, id: &str) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>("SELECT id, created_at, updated_at FROM carts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound("Cart"))?;

        let items = self.items(id).await?;
        Ok(Cart::from_parts(row, items))
    }

    /// Lines of a cart in insertion order.
    pub async fn items(&self, id: &str) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r#"
            SELECT ci.quantity,
                   p.id AS product_id, p.title, p.description, p.code, p.price,
                   p.status, p.stock, p.category, p.thumbnail,
                   p.created_at AS product_created_at,
                   p.updated_at AS product_updated_at
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = ?
            ORDER BY ci.rowid ASC
            "#,
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    /// Add `quantity` of a product. An existing line for the product grows
    /// by `quantity` instead of being duplicated, saturating at `MAX_QUANTITY`.
    pub async fn add_item(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<Cart, RepositoryError> {
        self.ensure_cart(cart_id).await?;
        self.ensure_product(product_id).await?;

        let now = now();
        sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(cart_id, product_id) DO UPDATE SET
                quantity = MIN(quantity + excluded.quantity, ?),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(&now)
        .bind(&now)
        .bind(MAX_QUANTITY)
        .execute(self.pool)
        .await?;

        self.touch(cart_id, &now).await?;
        self.get(cart_id).await
    }

    /// Replace the quantity of a line already in the cart.
    pub async fn set_quantity(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<Cart, RepositoryError> {
        self.ensure_cart(cart_id).await?;

        let now = now();
        let result = sqlx::query(
            "UPDATE cart_items SET quantity = ?, updated_at = ? WHERE cart_id = ? AND product_id = ?",
        )
        .bind(quantity)
        .bind(&now)
        .bind(cart_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Cart item"));
        }

        self.touch(cart_id, &now).await?;
        self.get(cart_id).await
    }

    /// Remove one product's line from the cart.
    pub async fn remove_item(&self, cart_id: &str, product_id: &str) -> Result<Cart, RepositoryError> {
        self.ensure_cart(cart_id).await?;

        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ? AND product_id = ?")
            .bind(cart_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Cart item"));
        }

        self.touch(cart_id, &now()).await?;
        self.get(cart_id).await
    }

    /// Drop every line. The cart itself stays.
    pub async fn clear(&self, cart_id: &str) -> Result<Cart, RepositoryError> {
        self.ensure_cart(cart_id).await?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        self.touch(cart_id, &now()).await?;
        self.get(cart_id).await
    }

    async fn ensure_cart(&self, cart_id: &str) -> Result<(), RepositoryError> {
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM carts WHERE id = ?")
            .bind(cart_id)
            .fetch_optional(self.pool)
            .await?;
        exists.map(|_| ()).ok_or(RepositoryError::NotFound("Cart"))
    }

    async fn ensure_product(&self, product_id: &str) -> Result<(), RepositoryError> {
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(self.pool)
            .await?;
        exists.map(|_| ()).ok_or(RepositoryError::NotFound("Product"))
    }

    async fn touch(&self, cart_id: &str, now: &str) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE carts SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(cart_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
