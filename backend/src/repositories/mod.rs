//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod memory;
pub mod product;
pub mod user;

pub use memory::{InMemoryProductRepository, InMemoryUserRepository};
pub use product::{
    NewProduct, PgProductRepository, ProductRecord, ProductRepository, ProductWithVendor,
};
pub use user::{DuplicateEmail, NewUser, PgUserRepository, UserRecord, UserRepository};
