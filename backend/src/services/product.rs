//! Product catalog service
//!
//! Vendors manage their own products; anyone may browse the catalog.

use crate::error::ApiError;
use crate::repositories::{NewProduct, ProductRecord, ProductRepository, ProductWithVendor};
use procurement_shared::{validate_request, ProductListQuery, ProductRequest};
use tracing::{info, warn};

/// Product service for catalog operations
pub struct ProductService;

impl ProductService {
    fn validate(req: &ProductRequest) -> Result<(), ApiError> {
        validate_request(req).map_err(|f| ApiError::invalid_fields("Invalid product data", f))
    }

    /// Create a product owned by `vendor_id`
    pub async fn create_product(
        products: &dyn ProductRepository,
        vendor_id: i64,
        req: ProductRequest,
    ) -> Result<ProductRecord, ApiError> {
        Self::validate(&req)?;

        let product = products
            .create(NewProduct {
                vendor_id,
                name: req.name,
                price: req.price,
                stock: req.stock,
            })
            .await?;

        info!(product_id = product.id, vendor_id, "Product created");
        Ok(product)
    }

    pub async fn get_product(
        products: &dyn ProductRepository,
        id: i64,
    ) -> Result<ProductRecord, ApiError> {
        products
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))
    }

    /// Load a product and check it belongs to `vendor_id`
    async fn owned_product(
        products: &dyn ProductRepository,
        vendor_id: i64,
        id: i64,
    ) -> Result<ProductRecord, ApiError> {
        let product = Self::get_product(products, id).await?;
        if product.vendor_id != vendor_id {
            warn!(product_id = id, vendor_id, "Vendor tried to modify another vendor's product");
            return Err(ApiError::Forbidden(
                "You can only modify your own products".to_string(),
            ));
        }
        Ok(product)
    }

    pub async fn update_product(
        products: &dyn ProductRepository,
        vendor_id: i64,
        id: i64,
        req: ProductRequest,
    ) -> Result<ProductRecord, ApiError> {
        Self::validate(&req)?;
        let mut product = Self::owned_product(products, vendor_id, id).await?;

        product.name = req.name;
        product.price = req.price;
        product.stock = req.stock;

        let updated = products
            .update(&product)
            .await?
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

        info!(product_id = id, vendor_id, "Product updated");
        Ok(updated)
    }

    pub async fn delete_product(
        products: &dyn ProductRepository,
        vendor_id: i64,
        id: i64,
    ) -> Result<(), ApiError> {
        Self::owned_product(products, vendor_id, id).await?;

        if !products.delete(id).await? {
            return Err(ApiError::NotFound("Product not found".to_string()));
        }

        info!(product_id = id, vendor_id, "Product deleted");
        Ok(())
    }

    /// Public catalog listing
    pub async fn list_products(
        products: &dyn ProductRepository,
        query: &ProductListQuery,
    ) -> Result<Vec<ProductWithVendor>, ApiError> {
        Ok(products.list(query.name_filter(), query.page()).await?)
    }

    pub async fn list_vendor_products(
        products: &dyn ProductRepository,
        vendor_id: i64,
        query: &ProductListQuery,
    ) -> Result<Vec<ProductRecord>, ApiError> {
        Ok(products.list_by_vendor(vendor_id, query.page()).await?)
    }
}
