use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{CategoryRepository, ProductRepository};
use crate::domain::product::{NewProduct, Product, ProductChanges};

/// How many products the top-rated listing returns.
pub const TOP_RATED_LIMIT: usize = 10;

pub struct ProductService<R> {
    store: R,
}

impl<R: ProductRepository + CategoryRepository> ProductService<R> {
    pub fn new(store: R) -> Self {
        Self { store }
    }

    fn check_category(&self, category_id: Option<Uuid>) -> Result<(), DomainError> {
        match category_id {
            Some(id) if self.store.find_category(id)?.is_none() => {
                Err(DomainError::not_found("Category", id))
            }
            _ => Ok(()),
        }
    }

    pub fn create_product(&self, product: NewProduct) -> Result<Product, DomainError> {
        product.validate()?;
        self.check_category(product.category_id)?;
        let product = self.store.insert_product(product)?;
        log::info!("Product {} created ({})", product.id, product.name);
        Ok(product)
    }

    /// Edits the product under its row lock, so a restock or price change
    /// never overwrites a concurrent stock decrement or rating recompute.
    pub fn update_product(&self, id: Uuid, changes: ProductChanges) -> Result<Product, DomainError> {
        changes.validate()?;
        self.check_category(changes.category_id)?;

        let mut changes = Some(changes);
        let product = self.store.update_product_locked(id, &mut |p| match changes.take() {
            Some(changes) => p.apply_changes(changes),
            None => Ok(()),
        })?;
        log::info!(
            "Product {} updated: stock {}, status {}",
            product.id,
            product.stock_quantity,
            product.status
        );
        Ok(product)
    }

    pub fn get_product(&self, id: Uuid) -> Result<Product, DomainError> {
        self.store
            .find_product(id)?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    pub fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.store.list_products()
    }

    pub fn products_by_category(&self, category_id: Uuid) -> Result<Vec<Product>, DomainError> {
        self.store.find_products_by_category(category_id)
    }

    pub fn in_stock_products(&self) -> Result<Vec<Product>, DomainError> {
        self.store.find_in_stock_products()
    }

    pub fn top_rated_products(&self) -> Result<Vec<Product>, DomainError> {
        self.store.find_top_rated_products(TOP_RATED_LIMIT)
    }
}
