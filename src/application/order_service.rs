use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderInput, OrderStatus};
use crate::domain::ports::{OrderRepository, ProductRepository, UserRepository};

use super::stock_ledger::StockLedger;

pub struct OrderService<S> {
    store: S,
    ledger: StockLedger<S>,
}

impl<S> OrderService<S>
where
    S: OrderRepository + ProductRepository + UserRepository + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            ledger: StockLedger::new(store.clone()),
            store,
        }
    }

    /// Prices the order, takes every item's quantity out of stock and stores
    /// the order with its items.
    ///
    /// Items lacking a price or quantity add nothing to the total but are
    /// still stored. Stock decrements are not undone if a later item fails.
    pub fn place_order(&self, input: OrderInput) -> Result<Order, DomainError> {
        for item in &input.items {
            item.validate()?;
        }
        if self.store.find_user(input.user_id)?.is_none() {
            return Err(DomainError::not_found("User", input.user_id));
        }

        let mut total = BigDecimal::from(0);
        for item in &input.items {
            if let Some(line_total) = item.line_total() {
                total += line_total;
            }
            if let (Some(product_id), Some(quantity)) = (item.product_id, item.quantity) {
                self.ledger.decrement_stock(product_id, quantity)?;
            }
        }

        let order = self.store.insert_order(NewOrder {
            user_id: input.user_id,
            status: OrderStatus::Pending,
            total_price: total,
            items: input.items,
        })?;
        log::info!(
            "Order {} placed by user {} with {} items, total {}",
            order.id,
            order.user_id,
            order.items.len(),
            order.total_price
        );
        Ok(order)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.store
            .find_order(id)?
            .ok_or_else(|| DomainError::not_found("Order", id))
    }

    /// Every order, newest first.
    pub fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        self.store.list_orders()
    }

    pub fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        self.store.find_orders_by_user(user_id)
    }

    /// Moves the order to `status`. The total is left as computed at placement.
    pub fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError> {
        let order = self
            .store
            .update_order_status(id, status)?
            .ok_or_else(|| DomainError::not_found("Order", id))?;
        log::info!("Order {} moved to {}", id, status);
        Ok(order)
    }

    pub fn delete_order(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.store.delete_order(id)? {
            return Err(DomainError::not_found("Order", id));
        }
        log::info!("Order {} deleted", id);
        Ok(())
    }
}
