//! Catalog Repository Implementation
//!
//! Categories, products and product options.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    Category, CategoryRepository, NewProduct, NewProductOption, Product, ProductFilter,
    ProductOption, ProductRepository,
};
use crate::infrastructure::store::MemoryStore;
use crate::shared::error::AppError;

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.read().categories.values().cloned().collect())
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        Ok(self.read().categories.get(&id).cloned())
    }

    async fn create_category(
        &self,
        name: String,
        slug: String,
        description: Option<String>,
    ) -> Result<Category, AppError> {
        let mut tables = self.write();

        if tables.categories.values().any(|c| c.slug == slug) {
            return Err(AppError::Conflict(format!(
                "Category with slug '{}' already exists",
                slug
            )));
        }

        let id = tables.ids.categories.next();
        let category = Category {
            id,
            name,
            slug,
            description,
        };
        tables.categories.insert(id, category.clone());
        Ok(category)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        Ok(self
            .read()
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn find_product(&self, id: i64) -> Result<Option<Product>, AppError> {
        Ok(self.read().products.get(&id).cloned())
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Product>, AppError> {
        Ok(self
            .read()
            .products
            .values()
            .find(|p| p.external_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, AppError> {
        let mut tables = self.write();
        let id = tables.ids.products.next();
        let now = Utc::now();
        let created = Product {
            id,
            title: product.title,
            description: product.description,
            image_url: product.image_url,
            price: product.price,
            category_id: product.category_id,
            external_id: product.external_id,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(id, created.clone());
        Ok(created)
    }

    async fn update_product(&self, product: &Product) -> Result<Product, AppError> {
        let mut tables = self.write();
        let existing = tables
            .products
            .get_mut(&product.id)
            .ok_or_else(|| AppError::NotFound(format!("Product with id {} not found", product.id)))?;

        existing.title = product.title.clone();
        existing.description = product.description.clone();
        existing.image_url = product.image_url.clone();
        existing.price = product.price;
        existing.category_id = product.category_id;
        existing.external_id = product.external_id.clone();
        existing.updated_at = Utc::now();

        Ok(existing.clone())
    }

    async fn delete_product(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.write();
        if tables.products.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Product with id {} not found", id)));
        }
        tables.product_options.retain(|_, o| o.product_id != id);
        Ok(())
    }

    async fn options_for(&self, product_id: i64) -> Result<Vec<ProductOption>, AppError> {
        Ok(self
            .read()
            .product_options
            .values()
            .filter(|o| o.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn find_option(&self, id: i64) -> Result<Option<ProductOption>, AppError> {
        Ok(self.read().product_options.get(&id).cloned())
    }

    async fn create_option(&self, option: NewProductOption) -> Result<ProductOption, AppError> {
        let mut tables = self.write();
        if !tables.products.contains_key(&option.product_id) {
            return Err(AppError::NotFound(format!(
                "Product with id {} not found",
                option.product_id
            )));
        }

        let id = tables.ids.product_options.next();
        let created = ProductOption {
            id,
            product_id: option.product_id,
            option_type: option.option_type,
            value: option.value,
            price_modifier: option.price_modifier,
            in_stock: option.in_stock,
        };
        tables.product_options.insert(id, created.clone());
        Ok(created)
    }

    async fn update_option(&self, option: &ProductOption) -> Result<ProductOption, AppError> {
        let mut tables = self.write();
        let existing = tables
            .product_options
            .get_mut(&option.id)
            .ok_or_else(|| AppError::NotFound(format!("Option with id {} not found", option.id)))?;

        // product_id is fixed at creation
        existing.option_type = option.option_type;
        existing.value = option.value.clone();
        existing.price_modifier = option.price_modifier;
        existing.in_stock = option.in_stock;

        Ok(existing.clone())
    }

    async fn delete_option(&self, id: i64) -> Result<(), AppError> {
        self.write()
            .product_options
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Option with id {} not found", id)))
    }
}
