//! Product repository.

use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{CreateProductRequest, Product, UpdateProductRequest};
use super::{now, RepositoryError};

/// Repository for catalog operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All products, oldest first.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products ORDER BY created_at ASC, rowid ASC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    pub async fn get(&self, id: &str) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound("Product"))
    }

    /// Insert a product. The request is expected to be validated already.
    ///
    /// Returns `RepositoryError::Conflict` if the code is taken.
    pub async fn create(&self, req: &CreateProductRequest) -> Result<Product, RepositoryError> {
        let id = Uuid::new_v4().to_string();
        let now = now();

        sqlx::query(
            r#"
            INSERT INTO products
                (id, title, description, code, price, status, stock, category, thumbnail, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.code)
        .bind(req.price.unwrap_or_default())
        .bind(req.status)
        .bind(req.stock)
        .bind(&req.category)
        .bind(&req.thumbnail)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "A product with this code already exists"))?;

        self.get(&id).await
    }

    /// Apply the fields present in `req`, leaving the rest untouched.
    pub async fn update(
        &self,
        id: &str,
        req: &UpdateProductRequest,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                code = COALESCE(?, code),
                price = COALESCE(?, price),
                status = COALESCE(?, status),
                stock = COALESCE(?, stock),
                category = COALESCE(?, category),
                thumbnail = COALESCE(?, thumbnail),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.code)
        .bind(req.price)
        .bind(req.status)
        .bind(req.stock)
        .bind(&req.category)
        .bind(&req.thumbnail)
        .bind(now())
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "A product with this code already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Product"));
        }

        self.get(id).await
    }

    /// Delete a product. Cart lines referencing it go with it.
    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Product"));
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }
}
