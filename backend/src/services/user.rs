//! User service: vendor registration, approval workflow and account management
//!
//! # Performance Optimizations
//!
//! - Password hashing runs on blocking thread pool
//! - Repositories are trait objects shared through AppState

use crate::auth::{hash_async, AuthUser, CredentialHasher};
use crate::config::AdminBootstrapConfig;
use crate::error::ApiError;
use crate::repositories::{DuplicateEmail, NewUser, UserRecord, UserRepository};
use procurement_shared::{validate_request, RegisterVendorRequest, Role, UpdateUserRequest, UserStatus};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::info;

/// Storage errors from account writes; a lost race on the email becomes a conflict
fn write_error(err: anyhow::Error) -> ApiError {
    if err.is::<DuplicateEmail>() {
        ApiError::Conflict("Email already registered".to_string())
    } else {
        ApiError::Internal(err)
    }
}

/// User service for account operations
pub struct UserService;

impl UserService {
    /// Register a vendor account awaiting admin approval
    pub async fn register_vendor(
        users: &dyn UserRepository,
        hasher: Arc<dyn CredentialHasher>,
        req: RegisterVendorRequest,
    ) -> Result<UserRecord, ApiError> {
        validate_request(&req).map_err(|f| ApiError::invalid_fields("Invalid user data", f))?;

        if users.get_by_email(&req.email).await?.is_some() {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_async(hasher, req.password).await?;

        let user = users
            .create(NewUser {
                name: req.name,
                username: req.username,
                email: req.email,
                password_hash,
                role: Role::Vendor,
                status: UserStatus::Pending,
            })
            .await
            .map_err(write_error)?;

        info!(user_id = user.id, email = %user.email, "Vendor registered");
        Ok(user)
    }

    pub async fn get_user(users: &dyn UserRepository, id: i64) -> Result<UserRecord, ApiError> {
        users
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    pub async fn list_vendors(users: &dyn UserRepository) -> Result<Vec<UserRecord>, ApiError> {
        Ok(users.list_by_role(Role::Vendor).await?)
    }

    /// Partial update of an account's profile fields
    ///
    /// Callers may edit their own account; admins may edit any account.
    /// Role and status are not editable here.
    pub async fn update_user(
        users: &dyn UserRepository,
        hasher: Arc<dyn CredentialHasher>,
        actor: &AuthUser,
        id: i64,
        req: UpdateUserRequest,
    ) -> Result<UserRecord, ApiError> {
        if actor.user_id != id && !actor.is_admin() {
            return Err(ApiError::Forbidden(
                "You can only update your own account".to_string(),
            ));
        }
        validate_request(&req).map_err(|f| ApiError::invalid_fields("Invalid user data", f))?;

        let mut user = Self::get_user(users, id).await?;

        if let Some(email) = req.email {
            if email != user.email {
                if let Some(existing) = users.get_by_email(&email).await? {
                    if existing.id != id {
                        return Err(ApiError::Conflict("Email already registered".to_string()));
                    }
                }
                user.email = email;
            }
        }
        if let Some(name) = req.name {
            user.name = name;
        }
        if let Some(username) = req.username {
            user.username = username;
        }
        if let Some(password) = req.password {
            user.password_hash = hash_async(hasher, password).await?;
        }

        let updated = users
            .update(&user)
            .await
            .map_err(write_error)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!(user_id = id, actor_id = actor.user_id, "User updated");
        Ok(updated)
    }

    pub async fn approve_vendor(users: &dyn UserRepository, id: i64) -> Result<UserRecord, ApiError> {
        Self::set_vendor_status(users, id, UserStatus::Active).await
    }

    pub async fn reject_vendor(users: &dyn UserRepository, id: i64) -> Result<UserRecord, ApiError> {
        Self::set_vendor_status(users, id, UserStatus::Rejected).await
    }

    async fn set_vendor_status(
        users: &dyn UserRepository,
        id: i64,
        status: UserStatus,
    ) -> Result<UserRecord, ApiError> {
        let mut user = Self::get_user(users, id).await?;
        if user.role != Role::Vendor {
            return Err(ApiError::BadRequest("User is not a vendor".to_string()));
        }

        user.status = status;
        let updated = users
            .update(&user)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!(user_id = id, status = %status, "Vendor status changed");
        Ok(updated)
    }

    /// Delete an account; an admin cannot delete their own
    pub async fn delete_user(
        users: &dyn UserRepository,
        actor: &AuthUser,
        id: i64,
    ) -> Result<(), ApiError> {
        if actor.user_id == id {
            return Err(ApiError::Forbidden(
                "You cannot delete your own account".to_string(),
            ));
        }

        if !users.delete(id).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        info!(user_id = id, actor_id = actor.user_id, "User deleted");
        Ok(())
    }

    /// Create the configured admin account unless its email is taken
    ///
    /// Returns whether an account was created.
    pub async fn ensure_admin(
        users: &dyn UserRepository,
        hasher: Arc<dyn CredentialHasher>,
        admin: &AdminBootstrapConfig,
    ) -> anyhow::Result<bool> {
        if users.get_by_email(&admin.email).await?.is_some() {
            return Ok(false);
        }

        let password_hash = hash_async(hasher, admin.password.expose_secret().clone()).await?;
        let user = users
            .create(NewUser {
                name: admin.name.clone(),
                username: admin.username.clone(),
                email: admin.email.clone(),
                password_hash,
                role: Role::Admin,
                status: UserStatus::Active,
            })
            .await?;

        info!(user_id = user.id, email = %user.email, "Bootstrap admin created");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PasswordService;
    use crate::repositories::InMemoryUserRepository;
    use axum::http::StatusCode;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;
    use secrecy::SecretString;

    fn hasher() -> Arc<dyn CredentialHasher> {
        Arc::new(PasswordService)
    }

    fn registration(email: &str) -> RegisterVendorRequest {
        RegisterVendorRequest {
            name: "Acme Supplies".to_string(),
            username: "acme".to_string(),
            email: email.to_string(),
            password: "long-enough-secret".to_string(),
        }
    }

    fn admin() -> AuthUser {
        AuthUser {
            user_id: 100,
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn test_registered_vendor_is_pending() {
        let users = InMemoryUserRepository::new();
        let email: String = SafeEmail().fake();

        let user = UserService::register_vendor(&users, hasher(), registration(&email))
            .await
            .unwrap();

        assert_eq!(user.role, Role::Vendor);
        assert_eq!(user.status, UserStatus::Pending);
        assert_ne!(user.password_hash, "long-enough-secret");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let users = InMemoryUserRepository::new();
        UserService::register_vendor(&users, hasher(), registration("dup@x.io"))
            .await
            .unwrap();

        let err = UserService::register_vendor(&users, hasher(), registration("dup@x.io"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_registration_is_rejected() {
        let users = InMemoryUserRepository::new();
        let mut req = registration("not-an-email");
        req.password = "short".to_string();

        let err = UserService::register_vendor(&users, hasher(), req)
            .await
            .unwrap_err();
        match err {
            ApiError::Validation { fields, .. } => assert_eq!(fields.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_approve_and_reject_vendor() {
        let users = InMemoryUserRepository::new();
        let vendor = UserService::register_vendor(&users, hasher(), registration("v@x.io"))
            .await
            .unwrap();

        let approved = UserService::approve_vendor(&users, vendor.id).await.unwrap();
        assert_eq!(approved.status, UserStatus::Active);

        let rejected = UserService::reject_vendor(&users, vendor.id).await.unwrap();
        assert_eq!(rejected.status, UserStatus::Rejected);

        let err = UserService::approve_vendor(&users, 999).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_only_vendors_can_be_approved() {
        let users = InMemoryUserRepository::new();
        let config = AdminBootstrapConfig {
            name: "Root".to_string(),
            username: "root".to_string(),
            email: "root@x.io".to_string(),
            password: SecretString::new("root-password".to_string()),
        };
        UserService::ensure_admin(&users, hasher(), &config).await.unwrap();
        let root = users.get_by_email("root@x.io").await.unwrap().unwrap();

        let err = UserService::approve_vendor(&users, root.id).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_requires_self_or_admin() {
        let users = InMemoryUserRepository::new();
        let vendor = UserService::register_vendor(&users, hasher(), registration("v@x.io"))
            .await
            .unwrap();
        let other = AuthUser {
            user_id: vendor.id + 1,
            role: Role::Vendor,
        };
        let req = UpdateUserRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };

        let err = UserService::update_user(&users, hasher(), &other, vendor.id, req.clone())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let me = AuthUser {
            user_id: vendor.id,
            role: Role::Vendor,
        };
        let updated = UserService::update_user(&users, hasher(), &me, vendor.id, req.clone())
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.email, "v@x.io");

        assert!(UserService::update_user(&users, hasher(), &admin(), vendor.id, req)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let users = InMemoryUserRepository::new();
        UserService::register_vendor(&users, hasher(), registration("a@x.io"))
            .await
            .unwrap();
        let b = UserService::register_vendor(&users, hasher(), registration("b@x.io"))
            .await
            .unwrap();

        let req = UpdateUserRequest {
            email: Some("a@x.io".to_string()),
            ..Default::default()
        };
        let err = UserService::update_user(&users, hasher(), &admin(), b.id, req)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    /// Email lookups miss, as when a concurrent write lands after the check
    struct StaleEmailLookup(InMemoryUserRepository);

    #[async_trait::async_trait]
    impl UserRepository for StaleEmailLookup {
        async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<UserRecord>> {
            self.0.get_by_id(id).await
        }

        async fn get_by_email(&self, _email: &str) -> anyhow::Result<Option<UserRecord>> {
            Ok(None)
        }

        async fn create(&self, user: NewUser) -> anyhow::Result<UserRecord> {
            self.0.create(user).await
        }

        async fn update(&self, user: &UserRecord) -> anyhow::Result<Option<UserRecord>> {
            self.0.update(user).await
        }

        async fn delete(&self, id: i64) -> anyhow::Result<bool> {
            self.0.delete(id).await
        }

        async fn list_by_role(&self, role: Role) -> anyhow::Result<Vec<UserRecord>> {
            self.0.list_by_role(role).await
        }
    }

    #[tokio::test]
    async fn test_email_taken_after_check_still_conflicts() {
        let users = StaleEmailLookup(InMemoryUserRepository::new());
        UserService::register_vendor(&users, hasher(), registration("a@x.io"))
            .await
            .unwrap();

        let err = UserService::register_vendor(&users, hasher(), registration("a@x.io"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let b = UserService::register_vendor(&users, hasher(), registration("b@x.io"))
            .await
            .unwrap();
        let req = UpdateUserRequest {
            email: Some("a@x.io".to_string()),
            ..Default::default()
        };
        let err = UserService::update_user(&users, hasher(), &admin(), b.id, req)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_create_one_account() {
        let users = Arc::new(InMemoryUserRepository::new());
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let users = users.clone();
            tasks.spawn(async move {
                UserService::register_vendor(users.as_ref(), hasher(), registration("race@x.io"))
                    .await
                    .map(|_| ())
                    .map_err(|e| e.status())
            });
        }

        let mut created = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(()) => created += 1,
                Err(status) => assert_eq!(status, StatusCode::CONFLICT),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(users.list_by_role(Role::Vendor).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_password_update_rehashes() {
        let users = InMemoryUserRepository::new();
        let vendor = UserService::register_vendor(&users, hasher(), registration("v@x.io"))
            .await
            .unwrap();
        let req = UpdateUserRequest {
            password: Some("another-long-secret".to_string()),
            ..Default::default()
        };

        let updated = UserService::update_user(&users, hasher(), &admin(), vendor.id, req)
            .await
            .unwrap();
        assert!(PasswordService.verify("another-long-secret", &updated.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let users = InMemoryUserRepository::new();
        let vendor = UserService::register_vendor(&users, hasher(), registration("v@x.io"))
            .await
            .unwrap();
        let me = AuthUser {
            user_id: vendor.id,
            role: Role::Admin,
        };

        let err = UserService::delete_user(&users, &me, vendor.id).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        UserService::delete_user(&users, &admin(), vendor.id).await.unwrap();
        let err = UserService::delete_user(&users, &admin(), vendor.id).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let users = InMemoryUserRepository::new();
        let config = AdminBootstrapConfig {
            name: "Root".to_string(),
            username: "root".to_string(),
            email: "root@x.io".to_string(),
            password: SecretString::new("root-password".to_string()),
        };

        assert!(UserService::ensure_admin(&users, hasher(), &config).await.unwrap());
        assert!(!UserService::ensure_admin(&users, hasher(), &config).await.unwrap());

        let admins = users.list_by_role(Role::Admin).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].status, UserStatus::Active);
    }
}
