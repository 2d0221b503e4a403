use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{Product, ProductStatus};

/// Owns the rule for taking units out of a product's stock.
pub struct StockLedger<R> {
    products: R,
}

impl<R: ProductRepository> StockLedger<R> {
    pub fn new(products: R) -> Self {
        Self { products }
    }

    /// Subtracts `quantity` from the product's stock under the product's row
    /// lock, flagging it out of stock once nothing is left.
    pub fn decrement_stock(&self, product_id: Uuid, quantity: i32) -> Result<Product, DomainError> {
        let mut was_out_of_stock = false;
        let product = self.products.update_product_locked(product_id, &mut |p| {
            was_out_of_stock = p.status == ProductStatus::OutOfStock;
            p.consume_stock(quantity)
        })?;

        log::debug!(
            "Product {} stock decremented by {} to {}",
            product_id,
            quantity,
            product.stock_quantity
        );
        if product.stock_quantity < 0 {
            log::warn!(
                "Product {} oversold, stock is now {}",
                product_id,
                product.stock_quantity
            );
        } else if product.status == ProductStatus::OutOfStock && !was_out_of_stock {
            log::warn!("Product {} is now out of stock", product_id);
        }
        Ok(product)
    }
}
