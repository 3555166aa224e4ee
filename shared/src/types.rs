//! API request and response types

use crate::models::{Role, UserStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default page size for catalog listings
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Upper bound on page size for catalog listings
pub const MAX_PAGE_LIMIT: i64 = 100;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Plain acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Acknowledgement with a payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub message: String,
    pub data: T,
}

// ============================================================================
// Authentication
// ============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Login response: token pair plus the public view of the account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub data: UserResponse,
}

/// Refresh request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub refresh_token: String,
}

/// Refresh response (the refresh token itself is not rotated)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

// ============================================================================
// Users and vendors
// ============================================================================

/// Vendor self-registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterVendorRequest {
    #[validate(length(min = 1, max = 255, message = "is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "is required"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "must be between 8 and 128 characters"))]
    pub password: String,
}

/// Partial account update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub username: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128, message = "must be between 8 and 128 characters"))]
    pub password: Option<String>,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Product catalog
// ============================================================================

/// Create/update product request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 255, message = "is required"))]
    pub name: String,
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub price: i32,
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub stock: i32,
}

/// Product owned by a vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: i64,
    pub vendor_id: i64,
    pub name: String,
    pub price: i32,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog entry joined with the owning vendor's display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWithVendorResponse {
    pub id: i64,
    pub vendor_id: i64,
    pub product_name: String,
    pub price: i32,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
}

/// Catalog listing query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductListQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// Normalized paging window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub limit: i64,
    pub offset: i64,
}

impl ProductListQuery {
    /// Clamp paging to sane bounds.
    ///
    /// A missing or non-positive limit falls back to the default page size,
    /// larger limits are capped, and negative offsets start at zero.
    pub fn page(&self) -> PageParams {
        let limit = match self.limit {
            Some(l) if l > 0 => l.min(MAX_PAGE_LIMIT),
            _ => DEFAULT_PAGE_LIMIT,
        };
        let offset = self.offset.unwrap_or(0).max(0);
        PageParams { limit, offset }
    }

    /// Name filter with blank input treated as "no filter"
    pub fn name_filter(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 10, 0)]
    #[case(Some(0), Some(-5), 10, 0)]
    #[case(Some(-1), Some(20), 10, 20)]
    #[case(Some(25), Some(3), 25, 3)]
    #[case(Some(10_000), None, 100, 0)]
    fn test_page_normalization(
        #[case] limit: Option<i64>,
        #[case] offset: Option<i64>,
        #[case] expected_limit: i64,
        #[case] expected_offset: i64,
    ) {
        let query = ProductListQuery {
            name: None,
            limit,
            offset,
        };
        assert_eq!(
            query.page(),
            PageParams {
                limit: expected_limit,
                offset: expected_offset
            }
        );
    }

    #[test]
    fn test_blank_name_filter_is_ignored() {
        let query = ProductListQuery {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.name_filter(), None);

        let query = ProductListQuery {
            name: Some(" pipe ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.name_filter(), Some("pipe"));
    }

    #[test]
    fn test_product_request_rejects_non_positive_amounts() {
        let req = ProductRequest {
            name: "Steel pipe".to_string(),
            price: 0,
            stock: -3,
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_login_request_requires_email_format() {
        let req = LoginRequest {
            email: "not-an-email".to_string(),
            password: "pw".to_string(),
        };
        assert!(req.validate().is_err());

        let req = LoginRequest {
            email: "a@b.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_validates_only_present_fields() {
        let req = UpdateUserRequest::default();
        assert!(req.validate().is_ok());

        let req = UpdateUserRequest {
            password: Some("short".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    proptest! {
        /// Whatever the client sends, the paging window stays in bounds
        #[test]
        fn prop_page_is_always_bounded(
            limit in proptest::option::of(any::<i64>()),
            offset in proptest::option::of(any::<i64>())
        ) {
            let page = ProductListQuery { name: None, limit, offset }.page();
            prop_assert!((1..=MAX_PAGE_LIMIT).contains(&page.limit));
            prop_assert!(page.offset >= 0);
        }
    }
}
