//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: JWT keys, DB pools are created once
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Explicit wiring**: repositories and the authenticator are injected, never global

use crate::auth::{Authenticator, CredentialHasher, JwtService, PasswordService};
use crate::config::AppConfig;
use crate::repositories::{
    PgProductRepository, PgUserRepository, ProductRepository, UserRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
///
/// # Performance
///
/// - `db`: PgPool is internally Arc'd, cloning is O(1)
/// - `config`: Wrapped in Arc, cloning is O(1)
/// - `jwt`: Pre-computed keys wrapped in Arc, cloning is O(1)
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub hasher: Arc<dyn CredentialHasher>,
    pub authenticator: Authenticator,
}

impl AppState {
    /// Create the production state backed by Postgres repositories
    ///
    /// Fails when the JWT configuration has no key material.
    pub fn new(db: PgPool, config: AppConfig) -> anyhow::Result<Self> {
        let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(db.clone()));
        let products: Arc<dyn ProductRepository> = Arc::new(PgProductRepository::new(db.clone()));
        Self::from_parts(db, config, users, products, Arc::new(PasswordService))
    }

    /// Assemble state from explicit collaborators
    pub fn from_parts(
        db: PgPool,
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> anyhow::Result<Self> {
        let jwt = JwtService::new(&config.jwt)?;
        let authenticator = Authenticator::new(users.clone(), hasher.clone(), jwt.clone());

        Ok(Self {
            db,
            config: Arc::new(config),
            jwt,
            users,
            products,
            hasher,
            authenticator,
        })
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}
