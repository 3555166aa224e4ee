//! JWT token generation and validation
//!
//! Two signing domains (access, refresh), each with its own pre-computed
//! HS256 key pair. A token verifies only against the domain it was issued
//! for, even when both domains are configured with the same secret.

use super::claims::{Claims, Identity, TokenDomain};
use crate::config::JwtConfig;
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// The only accepted signing algorithm
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Token codec failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("no signing key configured for the {0} domain")]
    MissingKey(TokenDomain),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// Pre-computed JWT keys for one signing domain
/// These are expensive to create, so we cache them in AppState
#[derive(Clone)]
struct DomainKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    expiry_secs: i64,
}

impl DomainKeys {
    fn new(domain: TokenDomain, secret: &str, expiry_secs: i64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingKey(domain));
        }
        Ok(Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            expiry_secs,
        })
    }
}

/// Access and refresh tokens issued together at login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// JWT service for token operations
///
/// Keys are derived once at startup and wrapped in Arc, so cloning the
/// service into handlers is cheap.
#[derive(Clone)]
pub struct JwtService {
    access: DomainKeys,
    refresh: DomainKeys,
    validation: Arc<Validation>,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// Fails with [`TokenError::MissingKey`] when either domain has no secret.
    pub fn new(config: &JwtConfig) -> Result<Self, TokenError> {
        let access = DomainKeys::new(
            TokenDomain::Access,
            config.access_secret.expose_secret(),
            config.access_token_expiry_secs,
        )?;
        let refresh = DomainKeys::new(
            TokenDomain::Refresh,
            config.refresh_secret.expose_secret(),
            config.refresh_token_expiry_secs,
        )?;

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            access,
            refresh,
            validation: Arc::new(validation),
        })
    }

    #[inline]
    fn keys(&self, domain: TokenDomain) -> &DomainKeys {
        match domain {
            TokenDomain::Access => &self.access,
            TokenDomain::Refresh => &self.refresh,
        }
    }

    /// Sign a token for `identity` in the given domain
    pub fn issue(&self, identity: &Identity, domain: TokenDomain) -> Result<String, TokenError> {
        let keys = self.keys(domain);
        let now = Utc::now().timestamp();

        let claims = Claims {
            identity: identity.clone(),
            iat: now,
            exp: now + keys.expiry_secs,
            jti: Uuid::new_v4().to_string(),
            token_type: domain,
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issue an access token and a refresh token sharing the same identity
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(identity, TokenDomain::Access)?,
            refresh_token: self.issue(identity, TokenDomain::Refresh)?,
        })
    }

    /// Verify a token against the given domain and return its claims
    pub fn verify(&self, token: &str, domain: TokenDomain) -> Result<Claims, TokenError> {
        let keys = self.keys(domain);
        let claims = decode::<Claims>(token, &keys.decoding, &self.validation)?.claims;

        if claims.token_type != domain || claims.identity.user_id <= 0 {
            return Err(TokenError::Malformed);
        }
        // jsonwebtoken treats exp == now as still valid
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Get access token expiry in seconds
    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.access.expiry_secs
    }
}
