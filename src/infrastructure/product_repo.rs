use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{ProductRatingUpdate, ProductRepository, ProductUpdate};
use crate::domain::product::{NewProduct, Product, ProductStatus};
use crate::schema::{products, reviews};

use super::models::{NewProductRow, ProductRow};
use super::DieselStore;

/// `SELECT … FOR UPDATE`: blocks until any other transaction holding the row
/// commits, then returns the committed state.
fn lock_product(conn: &mut PgConnection, id: Uuid) -> Result<Product, DomainError> {
    let row = products::table
        .find(id)
        .select(ProductRow::as_select())
        .for_update()
        .get_result(conn)
        .optional()?
        .ok_or_else(|| DomainError::not_found("Product", id))?;
    Product::try_from(row)
}

fn write_product(conn: &mut PgConnection, product: &Product) -> Result<Product, DomainError> {
    let row = diesel::update(products::table.find(product.id))
        .set((
            products::name.eq(&product.name),
            products::description.eq(product.description.as_deref()),
            products::price.eq(&product.price),
            products::category_id.eq(product.category_id),
            products::stock_quantity.eq(product.stock_quantity),
            products::status.eq(product.status.as_str()),
            products::rating.eq(product.rating),
            products::review_count.eq(product.review_count),
            products::updated_at.eq(Utc::now()),
        ))
        .returning(ProductRow::as_returning())
        .get_result(conn)?;
    Product::try_from(row)
}

impl ProductRepository for DieselStore {
    fn insert_product(&self, product: NewProduct) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                status: ProductStatus::for_stock(product.stock_quantity)
                    .as_str()
                    .to_string(),
                name: product.name,
                description: product.description,
                price: product.price,
                stock_quantity: product.stock_quantity,
                category_id: product.category_id,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;
        Product::try_from(row)
    }

    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Product::try_from)
            .transpose()
    }

    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        products::table
            .select(ProductRow::as_select())
            .order((products::created_at.asc(), products::id.asc()))
            .load(&mut conn)?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    fn find_products_by_category(&self, category_id: Uuid) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        products::table
            .filter(products::category_id.eq(category_id))
            .select(ProductRow::as_select())
            .order((products::created_at.asc(), products::id.asc()))
            .load(&mut conn)?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    fn find_in_stock_products(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        products::table
            .filter(products::stock_quantity.gt(0))
            .filter(products::status.eq(ProductStatus::Available.as_str()))
            .select(ProductRow::as_select())
            .order((products::created_at.asc(), products::id.asc()))
            .load(&mut conn)?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    fn find_top_rated_products(&self, limit: usize) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        products::table
            .select(ProductRow::as_select())
            .order((
                products::rating.desc(),
                products::review_count.desc(),
                products::id.asc(),
            ))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .load(&mut conn)?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    fn update_product_locked(
        &self,
        id: Uuid,
        apply: ProductUpdate<'_>,
    ) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let mut product = lock_product(conn, id)?;
            apply(&mut product)?;
            write_product(conn, &product)
        })
    }

    fn update_product_with_ratings(
        &self,
        id: Uuid,
        apply: ProductRatingUpdate<'_>,
    ) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let mut product = lock_product(conn, id)?;
            // Read after the lock so the set includes every review whose
            // writer committed before this recompute got its turn.
            let ratings: Vec<i32> = reviews::table
                .filter(reviews::product_id.eq(id))
                .select(reviews::rating)
                .load(conn)?;
            apply(&mut product, &ratings)?;
            write_product(conn, &product)
        })
    }
}
