//! Authentication routes
//!
//! Login, token refresh and vendor self-registration. All public.
//!
//! # Performance Optimizations
//!
//! - Uses pre-computed JWT keys from AppState (no per-request allocation)
//! - Password hashing runs on blocking thread pool (doesn't block async runtime)

use crate::error::{ApiError, ApiResult};
use crate::services::UserService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use procurement_shared::{
    validate_request, DataResponse, LoginRequest, LoginResponse, RefreshTokenRequest,
    RefreshTokenResponse, RegisterVendorRequest, UserResponse,
};

const TOKEN_TYPE: &str = "Bearer";

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/register-vendor", post(register_vendor))
}

/// Login with email and password
///
/// POST /api/v1/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    validate_request(&req).map_err(|f| ApiError::invalid_fields("Invalid login data", f))?;

    let outcome = state.authenticator.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        access_token: outcome.tokens.access_token,
        refresh_token: outcome.tokens.refresh_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: state.jwt().access_token_expiry_secs(),
        data: outcome.user.to_response(),
    }))
}

/// Exchange a refresh token for a new access token
///
/// POST /api/v1/refresh
async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> ApiResult<Json<RefreshTokenResponse>> {
    validate_request(&req).map_err(|f| ApiError::invalid_fields("Invalid refresh request", f))?;

    let access_token = state.authenticator.refresh(&req.refresh_token).await?;

    Ok(Json(RefreshTokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: state.jwt().access_token_expiry_secs(),
    }))
}

/// Register a vendor account; it stays pending until an admin approves it
///
/// POST /api/v1/register-vendor
async fn register_vendor(
    State(state): State<AppState>,
    Json(req): Json<RegisterVendorRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let user = UserService::register_vendor(state.users.as_ref(), state.hasher.clone(), req).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            message: "Vendor registered successfully".to_string(),
            data: user.to_response(),
        }),
    ))
}
