//! Identity claims carried inside access and refresh tokens

use crate::repositories::UserRecord;
use procurement_shared::{Role, UserStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signing domain a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenDomain {
    Access,
    Refresh,
}

impl fmt::Display for TokenDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenDomain::Access => f.write_str("access"),
            TokenDomain::Refresh => f.write_str("refresh"),
        }
    }
}

/// Who the token speaks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
}

impl From<&UserRecord> for Identity {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            status: user.status,
        }
    }
}

/// Full JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: Identity,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
    pub token_type: TokenDomain,
}

impl Claims {
    #[inline]
    pub fn user_id(&self) -> i64 {
        self.identity.user_id
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.identity.role
    }
}
