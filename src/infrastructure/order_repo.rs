use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderStatus};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, orders};

use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};
use super::DieselStore;

fn load_items(conn: &mut PgConnection, order: OrderRow) -> Result<Order, DomainError> {
    let items = OrderItemRow::belonging_to(&order)
        .select(OrderItemRow::as_select())
        .order(order_items::position.asc())
        .load(conn)?;
    order.into_order(items)
}

impl OrderRepository for DieselStore {
    fn insert_order(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order
            let order_id = Uuid::new_v4();
            let row = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id: order.user_id,
                    status: order.status.as_str().to_string(),
                    total_price: order.total_price.clone(),
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 2. Insert its items, keeping the buyer's line order
            let new_items: Vec<NewOrderItemRow> = order
                .items
                .iter()
                .enumerate()
                .map(|(position, item)| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price.clone(),
                    position: position as i32,
                })
                .collect();
            if !new_items.is_empty() {
                diesel::insert_into(order_items::table)
                    .values(&new_items)
                    .execute(conn)?;
            }

            load_items(conn, row)
        })
    }

    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        load_items(&mut conn, order).map(Some)
    }

    fn find_orders_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .select(OrderRow::as_select())
            .order((orders::created_at.desc(), orders::id.asc()))
            .load(&mut conn)?;

        let items = OrderItemRow::belonging_to(&rows)
            .select(OrderItemRow::as_select())
            .order(order_items::position.asc())
            .load(&mut conn)?
            .grouped_by(&rows);

        rows.into_iter()
            .zip(items)
            .map(|(order, items)| order.into_order(items))
            .collect()
    }

    fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .select(OrderRow::as_select())
            .order((orders::created_at.desc(), orders::id.asc()))
            .load(&mut conn)?;

        let items = OrderItemRow::belonging_to(&rows)
            .select(OrderItemRow::as_select())
            .order(order_items::position.asc())
            .load(&mut conn)?
            .grouped_by(&rows);

        rows.into_iter()
            .zip(items)
            .map(|(order, items)| order.into_order(items))
            .collect()
    }

    fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::update(orders::table.find(id))
                .set((
                    orders::status.eq(status.as_str()),
                    orders::updated_at.eq(Utc::now()),
                ))
                .returning(OrderRow::as_returning())
                .get_result(conn)
                .optional()?;

            match row {
                Some(row) => load_items(conn, row).map(Some),
                None => Ok(None),
            }
        })
    }

    fn delete_order(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        // order_items rows follow via ON DELETE CASCADE
        let deleted = diesel::delete(orders::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
