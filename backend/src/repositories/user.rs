//! User repository for database operations

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use procurement_shared::{Role, UserResponse, UserStatus};
use sqlx::PgPool;
use thiserror::Error;

/// User record as stored
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Public view without the password hash
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
}

/// Write rejected because another account already holds the email
///
/// Returned inside the `anyhow::Error` of `create` and `update`; callers
/// detect it with `err.is::<DuplicateEmail>()`.
#[derive(Debug, Error)]
#[error("email already registered: {0}")]
pub struct DuplicateEmail(pub String);

/// Storage interface for accounts
///
/// A missing row is `Ok(None)` (or `Ok(false)` for deletes). A unique
/// email violation is [`DuplicateEmail`]; any other `Err` is an
/// infrastructure failure.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn create(&self, user: NewUser) -> Result<UserRecord>;

    /// Persist every mutable column of `user`; returns the stored row
    async fn update(&self, user: &UserRecord) -> Result<Option<UserRecord>>;

    async fn delete(&self, id: i64) -> Result<bool>;

    async fn list_by_role(&self, role: Role) -> Result<Vec<UserRecord>>;
}

/// Row shape as returned by Postgres; role and status are TEXT columns
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            role: row
                .role
                .parse()
                .with_context(|| format!("user {} has an invalid role", row.id))?,
            status: row
                .status
                .parse()
                .with_context(|| format!("user {} has an invalid status", row.id))?,
            id: row.id,
            name: row.name,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Translate the UNIQUE constraint on `users.email` into [`DuplicateEmail`]
fn email_violation(err: sqlx::Error, email: &str) -> anyhow::Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DuplicateEmail(email.to_string()).into()
        }
        _ => err.into(),
    }
}

const USER_COLUMNS: &str =
    "id, name, username, email, password_hash, role, status, created_at, updated_at";

/// Postgres-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, username, email, password_hash, role, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| email_violation(e, &user.email))?;

        row.try_into()
    }

    async fn update(&self, user: &UserRecord) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = $2, username = $3, email = $4, password_hash = $5,
                role = $6, status = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| email_violation(e, &user.email))?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<UserRecord>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY id"
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str, status: &str) -> UserRow {
        UserRow {
            id: 3,
            name: "Acme".to_string(),
            username: "acme".to_string(),
            email: "acme@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: role.to_string(),
            status: status.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion() {
        let user = UserRecord::try_from(row("vendor", "pending")).unwrap();
        assert_eq!(user.role, Role::Vendor);
        assert_eq!(user.status, UserStatus::Pending);
    }

    #[test]
    fn test_row_with_unknown_role_is_rejected() {
        assert!(UserRecord::try_from(row("superuser", "active")).is_err());
        assert!(UserRecord::try_from(row("admin", "suspended")).is_err());
    }

    #[test]
    fn test_response_omits_password_hash() {
        let user = UserRecord::try_from(row("admin", "active")).unwrap();
        let json = serde_json::to_string(&user.to_response()).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"admin\""));
    }

    #[test]
    fn test_non_constraint_errors_stay_infrastructure_errors() {
        let err = email_violation(sqlx::Error::RowNotFound, "acme@example.com");
        assert!(!err.is::<DuplicateEmail>());
    }
}
