use uuid::Uuid;

use super::category::{Category, NewCategory};
use super::errors::DomainError;
use super::order::{NewOrder, Order, OrderStatus};
use super::product::{NewProduct, Product};
use super::review::{NewReview, Review};
use super::user::{NewUser, User};

/// Mutation applied to a product while its row is locked.
pub type ProductUpdate<'a> = &'a mut dyn FnMut(&mut Product) -> Result<(), DomainError>;

/// Like [`ProductUpdate`], also handed the ratings of every review attached
/// to the product, read under the same lock.
pub type ProductRatingUpdate<'a> =
    &'a mut dyn FnMut(&mut Product, &[i32]) -> Result<(), DomainError>;

pub trait ProductRepository: Send + Sync + 'static {
    fn insert_product(&self, product: NewProduct) -> Result<Product, DomainError>;
    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn list_products(&self) -> Result<Vec<Product>, DomainError>;
    fn find_products_by_category(&self, category_id: Uuid) -> Result<Vec<Product>, DomainError>;
    /// Available products with stock left.
    fn find_in_stock_products(&self) -> Result<Vec<Product>, DomainError>;
    /// Highest cached rating first, more reviews breaking ties.
    fn find_top_rated_products(&self, limit: usize) -> Result<Vec<Product>, DomainError>;

    /// Atomic read-modify-write of one product. Concurrent calls for the same
    /// product are serialized: each one reads the result of the previous one.
    /// Fails with `NotFound` if the product does not exist; if `apply` fails
    /// nothing is written.
    fn update_product_locked(
        &self,
        id: Uuid,
        apply: ProductUpdate<'_>,
    ) -> Result<Product, DomainError>;

    /// Same serialization guarantee as [`update_product_locked`], with the
    /// product's review ratings read after the lock is taken.
    ///
    /// [`update_product_locked`]: ProductRepository::update_product_locked
    fn update_product_with_ratings(
        &self,
        id: Uuid,
        apply: ProductRatingUpdate<'_>,
    ) -> Result<Product, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Inserts the order and all of its items in one transaction.
    fn insert_order(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn find_orders_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError>;
    fn list_orders(&self) -> Result<Vec<Order>, DomainError>;
    fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, DomainError>;
    /// Returns `false` when no order had this id. Items go with the order.
    fn delete_order(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait ReviewRepository: Send + Sync + 'static {
    fn insert_review(&self, review: NewReview) -> Result<Review, DomainError>;
    fn find_review(&self, id: Uuid) -> Result<Option<Review>, DomainError>;
    fn list_reviews(&self) -> Result<Vec<Review>, DomainError>;
    fn find_reviews_by_product(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError>;
    fn find_reviews_by_user(&self, user_id: Uuid) -> Result<Vec<Review>, DomainError>;
    /// Persists the rating and comment of an existing review.
    fn save_review(&self, review: &Review) -> Result<Review, DomainError>;
    fn delete_review(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    fn insert_user(&self, user: NewUser) -> Result<User, DomainError>;
    fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    fn list_users(&self) -> Result<Vec<User>, DomainError>;
    /// Overwrites username, email and full name.
    fn save_user(&self, user: &User) -> Result<User, DomainError>;
    /// `Conflict` while orders or reviews still reference the user.
    fn delete_user(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait CategoryRepository: Send + Sync + 'static {
    fn insert_category(&self, category: NewCategory) -> Result<Category, DomainError>;
    fn find_category(&self, id: Uuid) -> Result<Option<Category>, DomainError>;
    fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, DomainError>;
    fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
    fn list_active_categories(&self) -> Result<Vec<Category>, DomainError>;
    fn find_root_categories(&self) -> Result<Vec<Category>, DomainError>;
    fn find_subcategories(&self, parent_id: Uuid) -> Result<Vec<Category>, DomainError>;
    fn search_categories(&self, keyword: &str) -> Result<Vec<Category>, DomainError>;
    fn save_category(&self, category: &Category) -> Result<Category, DomainError>;
    /// Children become roots and products lose the reference.
    fn delete_category(&self, id: Uuid) -> Result<bool, DomainError>;
}

/// A storage backend covering every entity. Services share one clone each.
pub trait Store:
    ProductRepository
    + OrderRepository
    + ReviewRepository
    + UserRepository
    + CategoryRepository
    + Clone
{
}

impl<T> Store for T where
    T: ProductRepository
        + OrderRepository
        + ReviewRepository
        + UserRepository
        + CategoryRepository
        + Clone
{
}
