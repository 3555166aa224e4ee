//! Authentication middleware
//!
//! Verifies the bearer access token once per request and attaches the
//! caller's identity to the request extensions, where handlers and the role
//! gate read it back through the [`AuthUser`] extractor.
//!
//! # Performance
//!
//! Uses pre-computed JWT keys from AppState and never touches the database;
//! role and status are trusted from the token until it expires.

use super::claims::TokenDomain;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use procurement_shared::Role;
use tracing::debug;

/// Identity of the caller, valid for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
}

impl AuthUser {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Extract the token from an `Authorization` header value
///
/// Accepts exactly `Bearer <token>`: the scheme, one space, and a non-empty
/// token with no further spaces.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if scheme != "Bearer" || token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

/// Middleware that rejects requests without a valid access token
///
/// Apply with `route_layer(middleware::from_fn_with_state(state, authenticate))`.
/// Every failure is reported as the same 401; the reason is logged at debug.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(header) = request.headers().get(AUTHORIZATION) else {
        debug!("Missing authorization header");
        return Err(ApiError::unauthenticated());
    };

    let token = header.to_str().ok().and_then(bearer_token).ok_or_else(|| {
        debug!("Malformed authorization header");
        ApiError::unauthenticated()
    })?;

    let claims = state
        .jwt()
        .verify(token, TokenDomain::Access)
        .map_err(|e| {
            debug!(error = %e, "Access token rejected");
            ApiError::unauthenticated()
        })?;

    request.extensions_mut().insert(AuthUser {
        user_id: claims.user_id(),
        role: claims.role(),
    });

    Ok(next.run(request).await)
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(ApiError::unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::StatusCode;
    use rstest::rstest;

    #[rstest]
    #[case("Bearer abc.def.ghi", Some("abc.def.ghi"))]
    #[case("Bearer x", Some("x"))]
    #[case("Bearer", None)]
    #[case("Bearer ", None)]
    #[case("Token abc", None)]
    #[case("bearer abc", None)]
    #[case("Bearer  abc", None)]
    #[case("Bearer abc def", None)]
    #[case("abc", None)]
    #[case("", None)]
    fn test_bearer_token_shapes(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(bearer_token(header), expected);
    }

    #[tokio::test]
    async fn test_extractor_requires_attached_identity() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let user = AuthUser {
            user_id: 5,
            role: Role::Vendor,
        };
        parts.extensions.insert(user);
        let extracted = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, user);
        assert!(!extracted.is_admin());
    }
}
