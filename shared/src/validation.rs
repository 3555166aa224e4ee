//! Input validation helpers
//!
//! Request bodies derive `validator::Validate`; this module flattens the
//! resulting error tree into a stable, client-friendly list.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// One failed rule on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

/// Flatten validation errors into `(field, message)` pairs, sorted by field
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| FieldError {
                field: field.clone(),
                error: match &e.message {
                    Some(message) => format!("{} {}", field, message),
                    None => format!("Field '{}' failed validation for '{}' rule", field, e.code),
                },
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.error.cmp(&b.error)));
    out
}

/// Validate a request body, returning the flattened field errors on failure
pub fn validate_request<T: Validate>(value: &T) -> Result<(), Vec<FieldError>> {
    value.validate().map_err(|e| field_errors(&e))
}
