//! E-Procurement Shared Library
//!
//! This crate contains shared types, domain enumerations, and validation
//! utilities used by the backend and by API clients.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{Role, UserStatus};
pub use types::*;
pub use validation::{field_errors, validate_request, FieldError};
