//! User and vendor management routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use procurement_shared::{DataResponse, MessageResponse, UpdateUserRequest, UserResponse};

/// GET /api/v1/users/me
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::get_user(state.users.as_ref(), auth_user.user_id).await?;
    Ok(Json(user.to_response()))
}

/// GET /api/v1/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::get_user(state.users.as_ref(), id).await?;
    Ok(Json(user.to_response()))
}

/// PUT /api/v1/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<DataResponse<UserResponse>>> {
    let user = UserService::update_user(
        state.users.as_ref(),
        state.hasher.clone(),
        &auth_user,
        id,
        req,
    )
    .await?;

    Ok(Json(DataResponse {
        message: "User updated successfully".to_string(),
        data: user.to_response(),
    }))
}

/// PUT /api/v1/users/:id/approve (admin)
pub async fn approve_vendor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DataResponse<UserResponse>>> {
    let user = UserService::approve_vendor(state.users.as_ref(), id).await?;
    Ok(Json(DataResponse {
        message: "Vendor approved successfully".to_string(),
        data: user.to_response(),
    }))
}

/// PUT /api/v1/users/:id/reject (admin)
pub async fn reject_vendor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DataResponse<UserResponse>>> {
    let user = UserService::reject_vendor(state.users.as_ref(), id).await?;
    Ok(Json(DataResponse {
        message: "Vendor rejected successfully".to_string(),
        data: user.to_response(),
    }))
}

/// DELETE /api/v1/users/:id (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    UserService::delete_user(state.users.as_ref(), &auth_user, id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// GET /api/v1/vendors (admin)
pub async fn list_vendors(State(state): State<AppState>) -> ApiResult<Json<Vec<UserResponse>>> {
    let vendors = UserService::list_vendors(state.users.as_ref()).await?;
    Ok(Json(vendors.iter().map(|u| u.to_response()).collect()))
}
