//! Login and token refresh orchestration
//!
//! The authenticator owns no state of its own: it looks accounts up through
//! the user repository, checks secrets through the credential hasher and
//! signs tokens through the [`JwtService`]. Nothing is written on login or
//! refresh.

use super::claims::{Identity, TokenDomain};
use super::jwt::{JwtService, TokenError, TokenPair};
use super::password::{verify_async, CredentialHasher};
use crate::error::ApiError;
use crate::repositories::{UserRecord, UserRepository};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Login and refresh failures
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email or wrong secret; the two are indistinguishable
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("user account is not active")]
    UserNotActive,

    #[error("user not found")]
    UserNotFound,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("authentication backend failure")]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::UserNotActive => {
                ApiError::Unauthorized("User account is not active".to_string())
            }
            AuthError::UserNotFound => ApiError::NotFound("User not found".to_string()),
            AuthError::Token(TokenError::Signing(msg)) => {
                ApiError::Internal(anyhow::anyhow!("token signing failed: {}", msg))
            }
            AuthError::Token(TokenError::MissingKey(domain)) => {
                ApiError::Internal(anyhow::anyhow!("no key for {} tokens", domain))
            }
            AuthError::Token(kind) => {
                debug!(error = %kind, "Rejected token");
                ApiError::unauthenticated()
            }
            AuthError::Internal(err) => ApiError::Internal(err),
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub tokens: TokenPair,
    pub user: UserRecord,
}

/// Credential check plus token issuance
#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
    jwt: JwtService,
}

impl Authenticator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn CredentialHasher>,
        jwt: JwtService,
    ) -> Self {
        Self { users, hasher, jwt }
    }

    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Exchange an email and secret for an access/refresh token pair
    ///
    /// Status is checked before the secret, so a pending or rejected vendor
    /// learns their account state only by knowing a registered email.
    pub async fn login(&self, email: &str, secret: &str) -> Result<LoginOutcome, AuthError> {
        let Some(user) = self.users.get_by_email(email).await? else {
            warn!(email = %email, "Login attempt with unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !user.status.is_active() {
            warn!(email = %email, status = %user.status, "Login attempt on inactive account");
            return Err(AuthError::UserNotActive);
        }

        let matches = verify_async(
            self.hasher.clone(),
            secret.to_string(),
            user.password_hash.clone(),
        )
        .await
        .map_err(|e| {
            error!(user_id = user.id, "Stored password hash is unusable");
            AuthError::Internal(e)
        })?;

        if !matches {
            warn!(email = %email, "Login attempt with incorrect password");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.jwt.issue_pair(&Identity::from(&user))?;
        info!(user_id = user.id, role = %user.role, "User logged in");

        Ok(LoginOutcome { tokens, user })
    }

    /// Mint a new access token from a refresh token
    ///
    /// Claims in the new token come from the stored account, not from the
    /// refresh token. The refresh token stays valid until it expires.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self
            .jwt
            .verify(refresh_token, TokenDomain::Refresh)
            .map_err(|e| {
                warn!(error = %e, "Invalid refresh token");
                e
            })?;

        let user = self
            .users
            .get_by_id(claims.user_id())
            .await?
            .ok_or_else(|| {
                warn!(user_id = claims.user_id(), "Refresh for missing user");
                AuthError::UserNotFound
            })?;

        let access_token = self.jwt.issue(&Identity::from(&user), TokenDomain::Access)?;
        info!(user_id = user.id, "Access token refreshed");

        Ok(access_token)
    }
}
