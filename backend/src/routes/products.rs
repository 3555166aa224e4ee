//! Product catalog routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::ProductService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use procurement_shared::{
    DataResponse, ProductListQuery, ProductRequest, ProductResponse,
    ProductWithVendorResponse,
};

/// GET /api/v1/products?name=&limit=&offset=
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Json<Vec<ProductWithVendorResponse>>> {
    let products = ProductService::list_products(state.products.as_ref(), &query).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProductResponse>> {
    let product = ProductService::get_product(state.products.as_ref(), id).await?;
    Ok(Json(product.to_response()))
}

/// POST /api/v1/products (vendor)
pub async fn create_product(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<ProductRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<ProductResponse>>)> {
    let product =
        ProductService::create_product(state.products.as_ref(), auth_user.user_id, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            message: "Product created successfully".to_string(),
            data: product.to_response(),
        }),
    ))
}

/// PUT /api/v1/products/:id (vendor, owner only)
pub async fn update_product(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> ApiResult<Json<DataResponse<ProductResponse>>> {
    let product =
        ProductService::update_product(state.products.as_ref(), auth_user.user_id, id, req)
            .await?;

    Ok(Json(DataResponse {
        message: "Product updated successfully".to_string(),
        data: product.to_response(),
    }))
}

/// DELETE /api/v1/products/:id (vendor, owner only)
pub async fn delete_product(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    ProductService::delete_product(state.products.as_ref(), auth_user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/my-products (vendor)
pub async fn my_products(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products =
        ProductService::list_vendor_products(state.products.as_ref(), auth_user.user_id, &query)
            .await?;
    Ok(Json(products.iter().map(|p| p.to_response()).collect()))
}
