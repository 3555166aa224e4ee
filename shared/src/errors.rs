//! Error types for the E-Procurement shared crate

use thiserror::Error;

/// Errors raised while interpreting domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown user status: {0}")]
    UnknownStatus(String),
}
