//! Input validation for API requests.
//!
//! Field validators return `Err(message)`; handlers collect them with
//! [`ValidationErrorBuilder`](super::error::ValidationErrorBuilder) so a
//! single response lists every bad field.

use lazy_static::lazy_static;
use regex::Regex;

use crate::db::{CreateProductRequest, NewUser, UpdateProductRequest, MAX_QUANTITY};

use super::error::{ApiError, ValidationErrorBuilder};

lazy_static! {
    /// Pragmatic email check: local part, @, dotted domain
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?)+$"
    ).unwrap();

    /// Product SKU (e.g. TCH-ARG-445)
    static ref PRODUCT_CODE_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9][A-Za-z0-9_-]*$"
    ).unwrap();
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a person name field
pub fn validate_name(value: &str, label: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }

    if value.len() > 100 {
        return Err(format!("{} is too long (max 100 characters)", label));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 4 {
        return Err("Password is too short (min 4 characters)".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

pub fn validate_age(age: Option<i64>) -> Result<(), String> {
    match age {
        Some(a) if !(0..=150).contains(&a) => Err("Age must be between 0 and 150".to_string()),
        _ => Ok(()),
    }
}

pub fn validate_phone(phone: Option<i64>) -> Result<(), String> {
    match phone {
        Some(p) if p < 0 => Err("Phone must be a positive number".to_string()),
        _ => Ok(()),
    }
}

pub fn validate_product_code(code: &str) -> Result<(), String> {
    if code.is_empty() {
        return Err("Code is required".to_string());
    }

    if code.len() > 64 {
        return Err("Code is too long (max 64 characters)".to_string());
    }

    if !PRODUCT_CODE_REGEX.is_match(code) {
        return Err("Code must be alphanumeric with dashes or underscores".to_string());
    }

    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price < 0.0 {
        return Err("Price must be a non-negative number".to_string());
    }
    Ok(())
}

pub fn validate_stock(stock: i64) -> Result<(), String> {
    if stock < 0 {
        return Err("Stock cannot be negative".to_string());
    }
    Ok(())
}

/// Validate a required free-text field such as title or category
pub fn validate_text(value: &str, label: &str, max: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }

    if value.len() > max {
        return Err(format!("{} is too long (max {} characters)", label, max));
    }

    Ok(())
}

/// Validate a thumbnail (optional field, empty string allowed)
pub fn validate_thumbnail(thumbnail: &Option<String>) -> Result<(), String> {
    if let Some(t) = thumbnail {
        if t.len() > 2048 {
            return Err("Thumbnail is too long (max 2048 characters)".to_string());
        }
    }
    Ok(())
}

pub fn validate_quantity(quantity: i64) -> Result<(), String> {
    if quantity < 1 {
        return Err("Quantity must be a positive integer".to_string());
    }

    if quantity > MAX_QUANTITY {
        return Err(format!("Quantity cannot exceed {}", MAX_QUANTITY));
    }

    Ok(())
}

/// Validate a UUID string
pub fn validate_uuid(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}

/// Path id check; a malformed id is a bad request rather than a missing resource
pub fn require_uuid(id: &str, field_name: &str) -> Result<(), ApiError> {
    validate_uuid(id, field_name).map_err(ApiError::bad_request)
}

pub fn validate_registration(user: &NewUser) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_name(&user.first_name, "First name") {
        errors.add("firstName", e);
    }
    if let Err(e) = validate_name(&user.last_name, "Last name") {
        errors.add("lastName", e);
    }
    if let Err(e) = validate_email(&user.email) {
        errors.add("email", e);
    }
    if let Err(e) = validate_password(&user.password) {
        errors.add("password", e);
    }
    if let Err(e) = validate_age(user.age) {
        errors.add("age", e);
    }
    if let Err(e) = validate_phone(user.phone) {
        errors.add("phone", e);
    }

    errors.finish()
}

pub fn validate_create_product(req: &CreateProductRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_text(&req.title, "Title", 200) {
        errors.add("title", e);
    }
    if let Err(e) = validate_text(&req.description, "Description", 2000) {
        errors.add("description", e);
    }
    if let Err(e) = validate_product_code(&req.code) {
        errors.add("code", e);
    }
    match req.price {
        Some(price) => {
            if let Err(e) = validate_price(price) {
                errors.add("price", e);
            }
        }
        None => {
            errors.add("price", "Price is required");
        }
    }
    if let Err(e) = validate_stock(req.stock) {
        errors.add("stock", e);
    }
    if let Err(e) = validate_text(&req.category, "Category", 100) {
        errors.add("category", e);
    }
    if let Err(e) = validate_thumbnail(&req.thumbnail) {
        errors.add("thumbnail", e);
    }

    errors.finish()
}

pub fn validate_update_product(req: &UpdateProductRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(ref title) = req.title {
        if let Err(e) = validate_text(title, "Title", 200) {
            errors.add("title", e);
        }
    }
    if let Some(ref description) = req.description {
        if let Err(e) = validate_text(description, "Description", 2000) {
            errors.add("description", e);
        }
    }
    if let Some(ref code) = req.code {
        if let Err(e) = validate_product_code(code) {
            errors.add("code", e);
        }
    }
    if let Some(price) = req.price {
        if let Err(e) = validate_price(price) {
            errors.add("price", e);
        }
    }
    if let Some(stock) = req.stock {
        if let Err(e) = validate_stock(stock) {
            errors.add("stock", e);
        }
    }
    if let Some(ref category) = req.category {
        if let Err(e) = validate_text(category, "Category", 100) {
            errors.add("category", e);
        }
    }
    if let Err(e) = validate_thumbnail(&req.thumbnail) {
        errors.add("thumbnail", e);
    }

    errors.finish()
}
