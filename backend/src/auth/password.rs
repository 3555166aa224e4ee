//! Credential hashing
//!
//! The authenticator only sees the [`CredentialHasher`] trait. The shipped
//! implementation is Argon2id with a random per-secret salt, stored as a PHC
//! string so parameters travel with the digest.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;

/// One-way credential hashing primitive
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext secret into a storable digest
    fn hash(&self, secret: &str) -> Result<String>;

    /// Check a plaintext secret against a stored digest
    ///
    /// `Ok(false)` means mismatch; `Err` means the digest itself is unusable.
    fn verify(&self, secret: &str, digest: &str) -> Result<bool>;
}

/// Argon2id password hashing
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordService;

impl CredentialHasher for PasswordService {
    fn hash(&self, secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow!("Failed to hash password: {}", e))
    }

    fn verify(&self, secret: &str, digest: &str) -> Result<bool> {
        let parsed =
            PasswordHash::new(digest).map_err(|e| anyhow!("Invalid hash format: {}", e))?;
        match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow!("Password verification failed: {}", e)),
        }
    }
}

/// Hash on the blocking thread pool so the async runtime keeps serving requests
pub async fn hash_async(hasher: Arc<dyn CredentialHasher>, secret: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hasher.hash(&secret))
        .await
        .map_err(|e| anyhow!("Task join error: {}", e))?
}

/// Verify on the blocking thread pool
pub async fn verify_async(
    hasher: Arc<dyn CredentialHasher>,
    secret: String,
    digest: String,
) -> Result<bool> {
    tokio::task::spawn_blocking(move || hasher.verify(&secret, &digest))
        .await
        .map_err(|e| anyhow!("Task join error: {}", e))?
}
