//! User and session models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::cart::Cart;

/// Role names stored in `users.role`
pub mod roles {
    pub const USER: &str = "user";
    pub const ADMIN: &str = "admin";
}

/// Row in `users`. Deliberately not `Serialize`: the password hash never
/// leaves the process. Use [`UserResponse`] or [`UserWithCart`] on the wire.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<i64>,
    pub password_hash: String,
    pub phone: Option<i64>,
    pub role: String,
    pub cart_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == roles::ADMIN
    }

    /// Whether this user may read or modify the given cart
    pub fn can_access_cart(&self, cart_id: &str) -> bool {
        self.is_admin() || self.cart_id.as_deref() == Some(cart_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<i64>,
    pub phone: Option<i64>,
    pub role: String,
    /// Id of the user's cart, unresolved
    pub cart: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            age: user.age,
            phone: user.phone,
            role: user.role,
            cart: user.cart_id,
            created_at: user.created_at,
        }
    }
}

/// A user with the cart reference resolved into the full cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithCart {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<i64>,
    pub phone: Option<i64>,
    pub role: String,
    pub cart: Option<Cart>,
    pub created_at: String,
}

impl UserWithCart {
    pub fn new(user: User, cart: Option<Cart>) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            age: user.age,
            phone: user.phone,
            role: user.role,
            cart,
            created_at: user.created_at,
        }
    }
}

/// Fields accepted when persisting a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<i64>,
    pub password: String,
    pub phone: Option<i64>,
    /// Defaults to [`roles::USER`] when `None`
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub age: Option<i64>,
    #[serde(default)]
    pub password: String,
    pub phone: Option<i64>,
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        Self {
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            email: req.email.trim().to_lowercase(),
            age: req.age,
            password: req.password,
            phone: req.phone,
            role: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "u-1".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "jdoe@gmail.com".to_string(),
            age: Some(22),
            password_hash: "$argon2id$v=19$secret".to_string(),
            phone: None,
            role: roles::USER.to_string(),
            cart_id: Some("c-1".to_string()),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_response_hides_password_and_uses_camel_case() {
        let json = serde_json::to_value(UserResponse::from(sample_user())).unwrap();
        assert_eq!(json["firstName"], "John");
        assert_eq!(json["lastName"], "Doe");
        assert_eq!(json["cart"], "c-1");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_cart_access() {
        let mut user = sample_user();
        assert!(user.can_access_cart("c-1"));
        assert!(!user.can_access_cart("c-2"));

        user.role = roles::ADMIN.to_string();
        assert!(user.can_access_cart("c-2"));
    }

    #[test]
    fn test_register_request_normalizes_email() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"firstName":" John ","lastName":"Doe","email":" JDoe@Gmail.com ","age":22,"password":"asdf"}"#,
        )
        .unwrap();
        let new_user = NewUser::from(req);
        assert_eq!(new_user.first_name, "John");
        assert_eq!(new_user.email, "jdoe@gmail.com");
        assert_eq!(new_user.age, Some(22));
        assert!(new_user.role.is_none());
    }
}
