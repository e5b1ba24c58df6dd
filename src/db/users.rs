//! User repository.
//!
//! A user references at most one cart through `users.cart_id`.
//! [`UserRepository::get_with_cart`] always resolves that reference, so
//! callers never need a second round trip to read the cart contents.

use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use super::carts::CartRepository;
use super::models::{roles, NewUser, User, UserWithCart};
use super::{now, RepositoryError};
use crate::crypto::hash_password;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: &str) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound("User"))
    }

    /// Fetch a user by id with the cart reference replaced by the full cart.
    ///
    /// `cart` is `None` only when the user has no cart reference.
    pub async fn get_with_cart(&self, id: &str) -> Result<UserWithCart, RepositoryError> {
        let user = self.get(id).await?;

        let cart = match user.cart_id.as_deref() {
            Some(cart_id) => Some(CartRepository::new(self.pool).get(cart_id).await?),
            None => None,
        };

        Ok(UserWithCart::new(user, cart))
    }

    /// Emails are compared case-insensitively.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email.trim())
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Persist a new user without a cart. The password is hashed here; role
    /// defaults to `"user"`.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let id = Uuid::new_v4().to_string();
        insert_user(self.pool, &id, new_user, None, &now()).await?;
        self.get(&id).await
    }

    /// Create a user together with a fresh empty cart and link the two.
    pub async fn create_with_cart(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let id = Uuid::new_v4().to_string();
        let cart_id = Uuid::new_v4().to_string();
        let now = now();

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO carts (id, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(&cart_id)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        insert_user(&mut *tx, &id, new_user, Some(&cart_id), &now).await?;

        tx.commit().await?;

        self.get(&id).await
    }

    /// Point the user's single cart reference at `cart_id`.
    pub async fn attach_cart(&self, user_id: &str, cart_id: &str) -> Result<User, RepositoryError> {
        let result = sqlx::query("UPDATE users SET cart_id = ?, updated_at = ? WHERE id = ?")
            .bind(cart_id)
            .bind(now())
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("User"));
        }

        self.get(user_id).await
    }

    /// Delete a user along with their cart and sessions.
    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart_id: Option<(Option<String>,)> = sqlx::query_as("SELECT cart_id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some((cart_id,)) = cart_id else {
            return Err(RepositoryError::NotFound("User"));
        };

        // Sessions cascade from users
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(cart_id) = cart_id {
            sqlx::query("DELETE FROM carts WHERE id = ?")
                .bind(&cart_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }
}

async fn insert_user<'c, E>(
    executor: E,
    id: &str,
    new_user: &NewUser,
    cart_id: Option<&str>,
    now: &str,
) -> Result<(), RepositoryError>
where
    E: Executor<'c, Database = Sqlite>,
{
    let password_hash = hash_password(&new_user.password)
        .map_err(|e| RepositoryError::PasswordHash(e.to_string()))?;
    let role = new_user.role.as_deref().unwrap_or(roles::USER);

    sqlx::query(
        r#"
        INSERT INTO users
            (id, first_name, last_name, email, age, password_hash, phone, role, cart_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&new_user.first_name)
    .bind(&new_user.last_name)
    .bind(&new_user.email)
    .bind(new_user.age)
    .bind(&password_hash)
    .bind(new_user.phone)
    .bind(role)
    .bind(cart_id)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await
    .map_err(|e| RepositoryError::from_insert(e, "A user with this email already exists"))?;

    Ok(())
}
