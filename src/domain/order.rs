use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::InvalidInput(format!(
                "unknown order status '{}'",
                other
            ))),
        }
    }
}

/// A line item as submitted by the buyer. Any field may be missing.
#[derive(Debug, Clone, Default)]
pub struct OrderItemInput {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub price: Option<BigDecimal>,
}

impl OrderItemInput {
    /// `price * quantity`, or `None` when either is missing.
    pub fn line_total(&self) -> Option<BigDecimal> {
        match (&self.price, self.quantity) {
            (Some(price), Some(quantity)) => Some(price * BigDecimal::from(quantity)),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(quantity) = self.quantity {
            if quantity <= 0 {
                return Err(DomainError::InvalidInput(format!(
                    "item quantity must be positive, got {}",
                    quantity
                )));
            }
        }
        if let Some(price) = &self.price {
            if *price < BigDecimal::from(0) {
                return Err(DomainError::InvalidInput(format!(
                    "item price must not be negative, got {}",
                    price
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct OrderInput {
    pub user_id: Uuid,
    pub items: Vec<OrderItemInput>,
}

/// Everything the repository needs to insert an order and its items in one go.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_price: BigDecimal,
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub price: Option<BigDecimal>,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: Option<&str>, quantity: Option<i32>) -> OrderItemInput {
        OrderItemInput {
            product_id: None,
            quantity,
            price: price.map(|p| p.parse().expect("valid decimal")),
        }
    }

    #[test]
    fn line_total_is_exact() {
        let total = item(Some("0.10"), Some(3)).line_total().expect("total");
        assert_eq!(total, "0.30".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn line_total_missing_field_is_none() {
        assert!(item(None, Some(3)).line_total().is_none());
        assert!(item(Some("1.00"), None).line_total().is_none());
    }

    #[test]
    fn validate_rejects_zero_quantity_and_negative_price() {
        assert!(item(Some("1.00"), Some(0)).validate().is_err());
        assert!(item(Some("-1.00"), Some(1)).validate().is_err());
        assert!(item(None, None).validate().is_ok());
    }

    #[test]
    fn status_round_trips_through_storage_string() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }
}
