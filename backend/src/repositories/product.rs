//! Product catalog repository

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use procurement_shared::{PageParams, ProductResponse, ProductWithVendorResponse};
use sqlx::PgPool;

/// Product record as stored
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProductRecord {
    pub id: i64,
    pub vendor_id: i64,
    pub name: String,
    pub price: i32,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRecord {
    pub fn to_response(&self) -> ProductResponse {
        ProductResponse {
            id: self.id,
            vendor_id: self.vendor_id,
            name: self.name.clone(),
            price: self.price,
            stock: self.stock,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Catalog row joined with the vendor's display name
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProductWithVendor {
    pub id: i64,
    pub vendor_id: i64,
    pub product_name: String,
    pub price: i32,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub vendor_name: Option<String>,
}

impl From<ProductWithVendor> for ProductWithVendorResponse {
    fn from(p: ProductWithVendor) -> Self {
        Self {
            id: p.id,
            vendor_id: p.vendor_id,
            product_name: p.product_name,
            price: p.price,
            stock: p.stock,
            created_at: p.created_at,
            updated_at: p.updated_at,
            vendor_name: p.vendor_name,
        }
    }
}

/// Input for creating a product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub vendor_id: i64,
    pub name: String,
    pub price: i32,
    pub stock: i32,
}

/// Storage interface for the product catalog
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: NewProduct) -> Result<ProductRecord>;

    async fn get_by_id(&self, id: i64) -> Result<Option<ProductRecord>>;

    /// Persist name, price and stock; returns the stored row
    async fn update(&self, product: &ProductRecord) -> Result<Option<ProductRecord>>;

    async fn delete(&self, id: i64) -> Result<bool>;

    /// Newest first; `name` is a case-insensitive substring filter
    async fn list(&self, name: Option<&str>, page: PageParams) -> Result<Vec<ProductWithVendor>>;

    async fn list_by_vendor(&self, vendor_id: i64, page: PageParams) -> Result<Vec<ProductRecord>>;
}

/// Escape LIKE metacharacters so user input matches literally
fn like_pattern(name: &str) -> String {
    let escaped = name
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Postgres-backed product repository
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: NewProduct) -> Result<ProductRecord> {
        let record = sqlx::query_as::<_, ProductRecord>(
            r#"
            INSERT INTO products (vendor_id, name, price, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id, vendor_id, name, price, stock, created_at, updated_at
            "#,
        )
        .bind(product.vendor_id)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ProductRecord>> {
        let record = sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT id, vendor_id, name, price, stock, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update(&self, product: &ProductRecord) -> Result<Option<ProductRecord>> {
        let record = sqlx::query_as::<_, ProductRecord>(
            r#"
            UPDATE products
            SET name = $2, price = $3, stock = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, vendor_id, name, price, stock, created_at, updated_at
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, name: Option<&str>, page: PageParams) -> Result<Vec<ProductWithVendor>> {
        let pattern = name.map(like_pattern).unwrap_or_else(|| "%".to_string());

        let records = sqlx::query_as::<_, ProductWithVendor>(
            r#"
            SELECT p.id, p.vendor_id, p.name AS product_name, p.price, p.stock,
                   p.created_at, p.updated_at, u.name AS vendor_name
            FROM products p
            LEFT JOIN users u ON u.id = p.vendor_id
            WHERE p.name ILIKE $1
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn list_by_vendor(&self, vendor_id: i64, page: PageParams) -> Result<Vec<ProductRecord>> {
        let records = sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT id, vendor_id, name, price, stock, created_at, updated_at
            FROM products
            WHERE vendor_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(vendor_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("pipe"), "%pipe%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }
}
