//! Database seeders for built-in data
//!
//! This module contains functions to seed the database with initial data
//! like the sample catalog and the bootstrap admin account.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

use super::models::{roles, CreateProductRequest, NewUser};
use super::{ProductRepository, UserRepository};

/// Seed the sample catalog. Does nothing once the catalog has any product.
pub async fn seed_products(pool: &SqlitePool) -> Result<usize> {
    let repo = ProductRepository::new(pool);
    if repo.count().await? > 0 {
        return Ok(0);
    }

    info!("Seeding sample catalog...");

    // Format: (code, title, description, price, stock, category)
    let products: Vec<(&str, &str, &str, f64, i64, &str)> = vec![
        ("PAN-ARG-001", "Pan de campo", "Pan de campo con masa madre", 850.0, 40, "panificados"),
        ("MED-ARG-002", "Medialunas", "Docena de medialunas de manteca", 1500.0, 60, "panificados"),
        ("ALF-ARG-003", "Alfajor de maicena", "Alfajor de maicena con dulce de leche", 450.0, 120, "golosinas"),
        ("DDL-ARG-004", "Dulce de leche", "Dulce de leche repostero 400g", 1100.0, 35, "almacen"),
        ("YER-ARG-005", "Yerba mate", "Yerba mate con palo 1kg", 2300.0, 80, "almacen"),
    ];

    let count = products.len();
    for (code, title, description, price, stock, category) in products {
        repo.create(&CreateProductRequest {
            title: title.to_string(),
            description: description.to_string(),
            code: code.to_string(),
            price: Some(price),
            status: true,
            stock,
            category: category.to_string(),
            thumbnail: None,
        })
        .await
        .with_context(|| format!("Failed to seed product {}", code))?;
    }

    info!("Seeded {} sample products", count);
    Ok(count)
}

/// Create the bootstrap admin account unless a user with that email exists.
///
/// Returns whether an account was created.
pub async fn ensure_admin_user(pool: &SqlitePool, email: &str, password: &str) -> Result<bool> {
    let repo = UserRepository::new(pool);
    let email = email.trim().to_lowercase();

    if repo.find_by_email(&email).await?.is_some() {
        return Ok(false);
    }

    repo.create(&NewUser {
        first_name: "Admin".to_string(),
        last_name: "User".to_string(),
        email: email.clone(),
        age: None,
        password: password.to_string(),
        phone: None,
        role: Some(roles::ADMIN.to_string()),
    })
    .await
    .context("Failed to create admin user")?;

    info!(email = %email, "Created bootstrap admin user");
    Ok(true)
}
