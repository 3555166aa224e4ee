//! Route definitions for the E-Procurement API
//!
//! This module organizes all API routes and applies middleware.
//! Protected groups are layered as authenticate → role gate → handler.

use crate::auth::{authenticate, enforce_role, RoleGate};
use crate::state::AppState;
use axum::{
    http::{header, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use procurement_shared::Role;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod auth;
mod health;
mod products;
mod users;


pub use auth::auth_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .nest("/api/v1", api_routes(&state))
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API v1 routes
fn api_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(|| async { "E-Procurement API v1" }))
        .merge(auth::auth_routes())
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product));

    Router::new()
        .merge(public)
        .merge(authenticated_routes(state))
}

/// Routes that need a valid access token
fn authenticated_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users/me", get(users::get_me))
        .route("/users/:id", get(users::get_user).put(users::update_user))
        .merge(admin_routes())
        .merge(vendor_routes())
        .route_layer(from_fn_with_state(state.clone(), authenticate))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:id/approve", put(users::approve_vendor))
        .route("/users/:id/reject", put(users::reject_vendor))
        .route("/users/:id", axum::routing::delete(users::delete_user))
        .route("/vendors", get(users::list_vendors))
        .route_layer(from_fn_with_state(RoleGate::only(Role::Admin), enforce_role))
}

fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(products::create_product))
        .route(
            "/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/my-products", get(products::my_products))
        .route_layer(from_fn_with_state(RoleGate::only(Role::Vendor), enforce_role))
}
