//! Database models split into domain-specific modules.

pub mod cart;
pub mod product;
pub mod user;

pub use cart::*;
pub use product::*;
pub use user::*;
