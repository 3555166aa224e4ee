//! In-memory repositories
//!
//! Same contract as the Postgres repositories, backed by a `Vec` behind an
//! async `RwLock`. Used by router tests and for running without a database.

use super::product::{NewProduct, ProductRecord, ProductRepository, ProductWithVendor};
use super::user::{DuplicateEmail, NewUser, UserRecord, UserRepository};
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use procurement_shared::{PageParams, Role};
use std::sync::Arc;
use tokio::sync::RwLock;

struct Table<T> {
    rows: Vec<T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Slice out one page of an already-sorted row set
fn paginate<T>(rows: Vec<T>, page: PageParams) -> Vec<T> {
    let offset = usize::try_from(page.offset).unwrap_or(0);
    let limit = usize::try_from(page.limit).unwrap_or(0);
    rows.into_iter().skip(offset).take(limit).collect()
}

/// User storage held in process memory
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table<UserRecord>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord> {
        let mut table = self.table.write().await;
        // Mirrors the UNIQUE constraint on users.email
        if table.rows.iter().any(|u| u.email == user.email) {
            return Err(DuplicateEmail(user.email).into());
        }

        let now = Utc::now();
        let record = UserRecord {
            id: table.allocate_id(),
            name: user.name,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            status: user.status,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, user: &UserRecord) -> Result<Option<UserRecord>> {
        let mut table = self.table.write().await;
        if table
            .rows
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(DuplicateEmail(user.email.clone()).into());
        }

        let Some(stored) = table.rows.iter_mut().find(|u| u.id == user.id) else {
            return Ok(None);
        };
        *stored = UserRecord {
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|u| u.id != id);
        Ok(table.rows.len() < before)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<UserRecord>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }
}

/// Product storage held in process memory
///
/// Vendor names for catalog listings are resolved through the user repository.
/// Products of a deleted vendor are dropped before the next read or write,
/// matching `ON DELETE CASCADE` on `products.vendor_id`.
pub struct InMemoryProductRepository {
    table: RwLock<Table<ProductRecord>>,
    users: Arc<dyn UserRepository>,
}

impl InMemoryProductRepository {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            users,
        }
    }

    async fn cascade_deleted_vendors(&self) -> Result<()> {
        let mut vendor_ids: Vec<i64> = {
            let table = self.table.read().await;
            table.rows.iter().map(|p| p.vendor_id).collect()
        };
        vendor_ids.sort_unstable();
        vendor_ids.dedup();

        let mut gone = Vec::new();
        for id in vendor_ids {
            if self.users.get_by_id(id).await?.is_none() {
                gone.push(id);
            }
        }
        if !gone.is_empty() {
            let mut table = self.table.write().await;
            table.rows.retain(|p| !gone.contains(&p.vendor_id));
        }
        Ok(())
    }

    /// Snapshot sorted newest first
    async fn sorted(&self, keep: impl Fn(&ProductRecord) -> bool) -> Result<Vec<ProductRecord>> {
        self.cascade_deleted_vendors().await?;
        let table = self.table.read().await;
        let mut rows: Vec<ProductRecord> = table.rows.iter().filter(|p| keep(p)).cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: NewProduct) -> Result<ProductRecord> {
        // Mirrors the foreign key on products.vendor_id
        if self.users.get_by_id(product.vendor_id).await?.is_none() {
            bail!("vendor {} does not exist", product.vendor_id);
        }

        let mut table = self.table.write().await;
        let now = Utc::now();
        let record = ProductRecord {
            id: table.allocate_id(),
            vendor_id: product.vendor_id,
            name: product.name,
            price: product.price,
            stock: product.stock,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ProductRecord>> {
        self.cascade_deleted_vendors().await?;
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, product: &ProductRecord) -> Result<Option<ProductRecord>> {
        self.cascade_deleted_vendors().await?;
        let mut table = self.table.write().await;
        let Some(stored) = table.rows.iter_mut().find(|p| p.id == product.id) else {
            return Ok(None);
        };
        stored.name = product.name.clone();
        stored.price = product.price;
        stored.stock = product.stock;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.cascade_deleted_vendors().await?;
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|p| p.id != id);
        Ok(table.rows.len() < before)
    }

    async fn list(&self, name: Option<&str>, page: PageParams) -> Result<Vec<ProductWithVendor>> {
        let needle = name.map(str::to_lowercase);
        let rows = self
            .sorted(|p| match &needle {
                Some(n) => p.name.to_lowercase().contains(n.as_str()),
                None => true,
            })
            .await?;

        let mut listed = Vec::new();
        for p in paginate(rows, page) {
            let vendor_name = self.users.get_by_id(p.vendor_id).await?.map(|u| u.name);
            listed.push(ProductWithVendor {
                id: p.id,
                vendor_id: p.vendor_id,
                product_name: p.name,
                price: p.price,
                stock: p.stock,
                created_at: p.created_at,
                updated_at: p.updated_at,
                vendor_name,
            });
        }
        Ok(listed)
    }

    async fn list_by_vendor(&self, vendor_id: i64, page: PageParams) -> Result<Vec<ProductRecord>> {
        let rows = self.sorted(|p| p.vendor_id == vendor_id).await?;
        Ok(paginate(rows, page))
    }
}
