use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::review::RatingSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    Available,
    OutOfStock,
    Discontinued,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "AVAILABLE",
            ProductStatus::OutOfStock => "OUT_OF_STOCK",
            ProductStatus::Discontinued => "DISCONTINUED",
        }
    }

    /// Status a freshly created product starts in.
    pub fn for_stock(stock_quantity: i32) -> Self {
        if stock_quantity <= 0 {
            ProductStatus::OutOfStock
        } else {
            ProductStatus::Available
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(ProductStatus::Available),
            "OUT_OF_STOCK" => Ok(ProductStatus::OutOfStock),
            "DISCONTINUED" => Ok(ProductStatus::Discontinued),
            other => Err(DomainError::InvalidInput(format!(
                "unknown product status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock_quantity: i32,
    pub category_id: Option<Uuid>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("product name is required".into()));
        }
        if self.price < BigDecimal::from(0) {
            return Err(DomainError::InvalidInput("price must not be negative".into()));
        }
        if self.stock_quantity < 0 {
            return Err(DomainError::InvalidInput(
                "stock quantity must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Edits to an existing product. Fields left as `None` keep their value.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    /// Absolute stock level, e.g. after a delivery.
    pub stock_quantity: Option<i32>,
    pub category_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
}

impl ProductChanges {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::InvalidInput("product name is required".into()));
            }
        }
        if let Some(price) = &self.price {
            if *price < BigDecimal::from(0) {
                return Err(DomainError::InvalidInput("price must not be negative".into()));
            }
        }
        if let Some(stock) = self.stock_quantity {
            if stock < 0 {
                return Err(DomainError::InvalidInput(
                    "stock quantity must not be negative".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock_quantity: i32,
    pub status: ProductStatus,
    pub category_id: Option<Uuid>,
    pub rating: f64,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Takes `quantity` units out of stock. Stock may go negative; once it
    /// reaches zero the product is flagged out of stock until
    /// [`apply_changes`](Product::apply_changes) sets a positive level again.
    pub fn consume_stock(&mut self, quantity: i32) -> Result<(), DomainError> {
        if quantity <= 0 {
            return Err(DomainError::InvalidInput(format!(
                "quantity must be positive, got {}",
                quantity
            )));
        }
        self.stock_quantity = self.stock_quantity.checked_sub(quantity).ok_or_else(|| {
            DomainError::InvalidInput(format!(
                "stock of product {} cannot absorb {} more units",
                self.id, quantity
            ))
        })?;
        if self.stock_quantity <= 0 {
            self.status = ProductStatus::OutOfStock;
        }
        Ok(())
    }

    /// Applies `changes` and re-derives the status: out of stock whenever
    /// stock is at or below zero, otherwise discontinued if asked for (or
    /// already so and not overridden), otherwise available.
    pub fn apply_changes(&mut self, changes: ProductChanges) -> Result<(), DomainError> {
        changes.validate()?;
        if let Some(name) = changes.name {
            self.name = name;
        }
        if changes.description.is_some() {
            self.description = changes.description;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(stock) = changes.stock_quantity {
            self.stock_quantity = stock;
        }
        if changes.category_id.is_some() {
            self.category_id = changes.category_id;
        }

        let discontinued = match changes.status {
            Some(ProductStatus::Discontinued) => true,
            Some(ProductStatus::Available) => false,
            Some(ProductStatus::OutOfStock) if self.stock_quantity > 0 => {
                return Err(DomainError::InvalidInput(format!(
                    "product {} has {} units in stock and cannot be marked out of stock",
                    self.id, self.stock_quantity
                )));
            }
            Some(ProductStatus::OutOfStock) => false,
            None => self.status == ProductStatus::Discontinued,
        };
        self.status = if self.stock_quantity <= 0 {
            ProductStatus::OutOfStock
        } else if discontinued {
            ProductStatus::Discontinued
        } else {
            ProductStatus::Available
        };
        Ok(())
    }

    pub fn apply_rating(&mut self, summary: RatingSummary) {
        self.rating = summary.average;
        self.review_count = summary.count;
    }
}
