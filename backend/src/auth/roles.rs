//! Role-based access control
//!
//! A [`RoleGate`] is a fixed allow-set of roles checked after
//! [`authenticate`](super::authenticate) has attached the caller's identity.
//! Gates stack: each `route_layer` adds one more short-circuiting check.

use super::middleware::AuthUser;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use procurement_shared::Role;
use tracing::debug;

/// Allow-set of roles, one flag per variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleGate {
    vendor: bool,
    admin: bool,
}

impl RoleGate {
    /// Gate that admits a single role
    pub fn only(role: Role) -> Self {
        Self::any_of(&[role])
    }

    /// Gate that admits any of the given roles
    pub fn any_of(roles: &[Role]) -> Self {
        roles.iter().fold(Self::default(), |gate, role| gate.allow(*role))
    }

    fn allow(mut self, role: Role) -> Self {
        match role {
            Role::Vendor => self.vendor = true,
            Role::Admin => self.admin = true,
        }
        self
    }

    pub fn permits(&self, role: Role) -> bool {
        match role {
            Role::Vendor => self.vendor,
            Role::Admin => self.admin,
        }
    }

    /// Decide for an optional caller identity
    pub fn check(&self, user: Option<&AuthUser>) -> Result<(), ApiError> {
        let user = user.ok_or_else(ApiError::unauthenticated)?;
        if self.permits(user.role) {
            Ok(())
        } else {
            debug!(user_id = user.user_id, role = %user.role, "Role not permitted");
            Err(ApiError::Forbidden("Insufficient permissions".to_string()))
        }
    }
}

/// Middleware enforcing a [`RoleGate`]
///
/// Apply with `route_layer(middleware::from_fn_with_state(RoleGate::only(Role::Admin), enforce_role))`.
pub async fn enforce_role(
    State(gate): State<RoleGate>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    gate.check(request.extensions().get::<AuthUser>())?;
    Ok(next.run(request).await)
}
