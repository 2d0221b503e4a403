//! In-memory storage backend.
//!
//! Every table lives behind one mutex, so any read-modify-write done while
//! holding it is serialized against every other store call. Constraint
//! checks mirror the PostgreSQL schema (foreign keys, unique user names,
//! emails and category names) so workflows behave the same against either
//! backend.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::domain::category::{Category, NewCategory};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderItem, OrderStatus};
use crate::domain::ports::{
    CategoryRepository, OrderRepository, ProductRatingUpdate, ProductRepository, ProductUpdate,
    ReviewRepository, UserRepository,
};
use crate::domain::product::{NewProduct, Product, ProductStatus};
use crate::domain::review::{NewReview, Review};
use crate::domain::user::{NewUser, User};

#[derive(Default)]
struct Tables {
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, Order>,
    reviews: HashMap<Uuid, Review>,
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
}

impl Tables {
    fn check_category(&self, category_id: Option<Uuid>) -> Result<(), DomainError> {
        match category_id {
            Some(id) if !self.categories.contains_key(&id) => Err(DomainError::InvalidInput(
                format!("product references unknown category {}", id),
            )),
            _ => Ok(()),
        }
    }

    /// Swaps in `product` if its category reference is valid.
    fn store_product(&mut self, mut product: Product) -> Result<Product, DomainError> {
        self.check_category(product.category_id)?;
        product.updated_at = Utc::now();
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    fn sorted_products(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .values()
            .filter(|p| keep(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        products
    }

    fn sorted_orders(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.values().filter(|o| keep(o)).cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        orders
    }

    fn sorted_reviews(&self, keep: impl Fn(&Review) -> bool) -> Vec<Review> {
        let mut reviews: Vec<Review> = self.reviews.values().filter(|r| keep(r)).cloned().collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        reviews
    }

    fn sorted_categories(&self, keep: impl Fn(&Category) -> bool) -> Vec<Category> {
        let mut categories: Vec<Category> = self
            .categories
            .values()
            .filter(|c| keep(c))
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        categories
    }

    fn ratings_for(&self, product_id: Uuid) -> Vec<i32> {
        self.reviews
            .values()
            .filter(|r| r.product_id == product_id)
            .map(|r| r.rating)
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductRepository for InMemoryStore {
    fn insert_product(&self, product: NewProduct) -> Result<Product, DomainError> {
        let mut tables = self.tables.lock();
        tables.check_category(product.category_id)?;
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            status: ProductStatus::for_stock(product.stock_quantity),
            name: product.name,
            description: product.description,
            price: product.price,
            stock_quantity: product.stock_quantity,
            category_id: product.category_id,
            rating: 0.0,
            review_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.tables.lock().products.get(&id).cloned())
    }

    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.tables.lock().sorted_products(|_| true))
    }

    fn find_products_by_category(&self, category_id: Uuid) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .tables
            .lock()
            .sorted_products(|p| p.category_id == Some(category_id)))
    }

    fn find_in_stock_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.tables.lock().sorted_products(|p| {
            p.stock_quantity > 0 && p.status == ProductStatus::Available
        }))
    }

    fn find_top_rated_products(&self, limit: usize) -> Result<Vec<Product>, DomainError> {
        let mut products: Vec<Product> = self.tables.lock().products.values().cloned().collect();
        products.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then(b.review_count.cmp(&a.review_count))
                .then(a.id.cmp(&b.id))
        });
        products.truncate(limit);
        Ok(products)
    }

    fn update_product_locked(
        &self,
        id: Uuid,
        apply: ProductUpdate<'_>,
    ) -> Result<Product, DomainError> {
        let mut tables = self.tables.lock();
        let mut product = tables
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Product", id))?;
        apply(&mut product)?;
        tables.store_product(product)
    }

    fn update_product_with_ratings(
        &self,
        id: Uuid,
        apply: ProductRatingUpdate<'_>,
    ) -> Result<Product, DomainError> {
        let mut tables = self.tables.lock();
        let mut product = tables
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Product", id))?;
        let ratings = tables.ratings_for(id);
        apply(&mut product, &ratings)?;
        tables.store_product(product)
    }
}

impl OrderRepository for InMemoryStore {
    fn insert_order(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut tables = self.tables.lock();
        if !tables.users.contains_key(&order.user_id) {
            return Err(DomainError::InvalidInput(format!(
                "order references unknown user {}",
                order.user_id
            )));
        }
        if let Some(missing) = order
            .items
            .iter()
            .filter_map(|i| i.product_id)
            .find(|pid| !tables.products.contains_key(pid))
        {
            return Err(DomainError::InvalidInput(format!(
                "order item references unknown product {}",
                missing
            )));
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let stored = Order {
            id: order_id,
            user_id: order.user_id,
            status: order.status,
            total_price: order.total_price,
            created_at: now,
            updated_at: now,
            items: order
                .items
                .into_iter()
                .map(|i| OrderItem {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price: i.price,
                })
                .collect(),
        };
        tables.orders.insert(order_id, stored.clone());
        Ok(stored)
    }

    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.tables.lock().orders.get(&id).cloned())
    }

    fn find_orders_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        Ok(self.tables.lock().sorted_orders(|o| o.user_id == user_id))
    }

    fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.tables.lock().sorted_orders(|_| true))
    }

    fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, DomainError> {
        let mut tables = self.tables.lock();
        Ok(tables.orders.get_mut(&id).map(|order| {
            order.status = status;
            order.updated_at = Utc::now();
            order.clone()
        }))
    }

    fn delete_order(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.tables.lock().orders.remove(&id).is_some())
    }
}

impl ReviewRepository for InMemoryStore {
    fn insert_review(&self, review: NewReview) -> Result<Review, DomainError> {
        let mut tables = self.tables.lock();
        if !tables.products.contains_key(&review.product_id) {
            return Err(DomainError::InvalidInput(format!(
                "review references unknown product {}",
                review.product_id
            )));
        }
        if !tables.users.contains_key(&review.user_id) {
            return Err(DomainError::InvalidInput(format!(
                "review references unknown user {}",
                review.user_id
            )));
        }
        let now = Utc::now();
        let stored = Review {
            id: Uuid::new_v4(),
            product_id: review.product_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: now,
            updated_at: now,
        };
        tables.reviews.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn find_review(&self, id: Uuid) -> Result<Option<Review>, DomainError> {
        Ok(self.tables.lock().reviews.get(&id).cloned())
    }

    fn list_reviews(&self) -> Result<Vec<Review>, DomainError> {
        Ok(self.tables.lock().sorted_reviews(|_| true))
    }

    fn find_reviews_by_product(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError> {
        Ok(self.tables.lock().sorted_reviews(|r| r.product_id == product_id))
    }

    fn find_reviews_by_user(&self, user_id: Uuid) -> Result<Vec<Review>, DomainError> {
        Ok(self.tables.lock().sorted_reviews(|r| r.user_id == user_id))
    }

    fn save_review(&self, review: &Review) -> Result<Review, DomainError> {
        let mut tables = self.tables.lock();
        let stored = tables
            .reviews
            .get_mut(&review.id)
            .ok_or_else(|| DomainError::not_found("Review", review.id))?;
        stored.rating = review.rating;
        stored.comment = review.comment.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    fn delete_review(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.tables.lock().reviews.remove(&id).is_some())
    }
}

impl UserRepository for InMemoryStore {
    fn insert_user(&self, user: NewUser) -> Result<User, DomainError> {
        let mut tables = self.tables.lock();
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(DomainError::Conflict(format!(
                "username '{}' is taken",
                user.username
            )));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }
        let stored = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            created_at: Utc::now(),
        };
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.tables.lock().users.get(&id).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let mut users: Vec<User> = self.tables.lock().users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    fn save_user(&self, user: &User) -> Result<User, DomainError> {
        let mut tables = self.tables.lock();
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(DomainError::Conflict(format!(
                "username '{}' is taken",
                user.username
            )));
        }
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(DomainError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }
        let stored = tables
            .users
            .get_mut(&user.id)
            .ok_or_else(|| DomainError::not_found("User", user.id))?;
        stored.username = user.username.clone();
        stored.email = user.email.clone();
        stored.full_name = user.full_name.clone();
        Ok(stored.clone())
    }

    fn delete_user(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.tables.lock();
        let referenced = tables.orders.values().any(|o| o.user_id == id)
            || tables.reviews.values().any(|r| r.user_id == id);
        if referenced {
            return Err(DomainError::Conflict(format!(
                "user {} still has orders or reviews",
                id
            )));
        }
        Ok(tables.users.remove(&id).is_some())
    }
}

impl CategoryRepository for InMemoryStore {
    fn insert_category(&self, category: NewCategory) -> Result<Category, DomainError> {
        let mut tables = self.tables.lock();
        if tables.categories.values().any(|c| c.name == category.name) {
            return Err(DomainError::Conflict(format!(
                "category '{}' already exists",
                category.name
            )));
        }
        if let Some(parent_id) = category.parent_id {
            if !tables.categories.contains_key(&parent_id) {
                return Err(DomainError::InvalidInput(format!(
                    "category references unknown parent {}",
                    parent_id
                )));
            }
        }
        let now = Utc::now();
        let stored = Category {
            id: Uuid::new_v4(),
            name: category.name,
            description: category.description,
            parent_id: category.parent_id,
            active: category.active,
            created_at: now,
            updated_at: now,
        };
        tables.categories.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn find_category(&self, id: Uuid) -> Result<Option<Category>, DomainError> {
        Ok(self.tables.lock().categories.get(&id).cloned())
    }

    fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, DomainError> {
        Ok(self
            .tables
            .lock()
            .categories
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.tables.lock().sorted_categories(|_| true))
    }

    fn list_active_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.tables.lock().sorted_categories(|c| c.active))
    }

    fn find_root_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.tables.lock().sorted_categories(Category::is_root))
    }

    fn find_subcategories(&self, parent_id: Uuid) -> Result<Vec<Category>, DomainError> {
        Ok(self
            .tables
            .lock()
            .sorted_categories(|c| c.parent_id == Some(parent_id)))
    }

    fn search_categories(&self, keyword: &str) -> Result<Vec<Category>, DomainError> {
        Ok(self.tables.lock().sorted_categories(|c| c.matches(keyword)))
    }

    fn save_category(&self, category: &Category) -> Result<Category, DomainError> {
        let mut tables = self.tables.lock();
        if tables
            .categories
            .values()
            .any(|c| c.id != category.id && c.name == category.name)
        {
            return Err(DomainError::Conflict(format!(
                "category '{}' already exists",
                category.name
            )));
        }
        if let Some(parent_id) = category.parent_id {
            if parent_id == category.id || !tables.categories.contains_key(&parent_id) {
                return Err(DomainError::InvalidInput(format!(
                    "category {} cannot have parent {}",
                    category.id, parent_id
                )));
            }
        }
        let stored = tables
            .categories
            .get_mut(&category.id)
            .ok_or_else(|| DomainError::not_found("Category", category.id))?;
        stored.name = category.name.clone();
        stored.description = category.description.clone();
        stored.parent_id = category.parent_id;
        stored.active = category.active;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    fn delete_category(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.tables.lock();
        if tables.categories.remove(&id).is_none() {
            return Ok(false);
        }
        for child in tables.categories.values_mut() {
            if child.parent_id == Some(id) {
                child.parent_id = None;
            }
        }
        for product in tables.products.values_mut() {
            if product.category_id == Some(id) {
                product.category_id = None;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use super::*;

    fn seed_product(store: &InMemoryStore, stock: i32) -> Product {
        store
            .insert_product(NewProduct {
                name: "Lamp".into(),
                description: None,
                price: BigDecimal::from(10),
                stock_quantity: stock,
                category_id: None,
            })
            .expect("insert product")
    }

    #[test]
    fn failed_update_leaves_row_untouched() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 5);

        let result = store.update_product_locked(product.id, &mut |p| {
            p.stock_quantity = 0;
            Err(DomainError::InvalidInput("nope".into()))
        });

        assert!(result.is_err());
        let stored = store.find_product(product.id).unwrap().unwrap();
        assert_eq!(stored.stock_quantity, 5);
    }

    #[test]
    fn update_of_unknown_product_is_not_found() {
        let store = InMemoryStore::new();
        let result = store.update_product_locked(Uuid::new_v4(), &mut |_| Ok(()));
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn duplicate_username_conflicts() {
        let store = InMemoryStore::new();
        let new_user = |email: &str| NewUser {
            username: "grace".into(),
            email: email.into(),
            full_name: None,
        };
        store.insert_user(new_user("g@example.com")).unwrap();
        assert!(matches!(
            store.insert_user(new_user("other@example.com")),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn order_with_unknown_user_is_rejected() {
        let store = InMemoryStore::new();
        let result = store.insert_order(NewOrder {
            user_id: Uuid::new_v4(),
            status: OrderStatus::Pending,
            total_price: BigDecimal::from(0),
            items: vec![],
        });
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn same_instant_reviews_list_in_id_order() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 1);
        let user = store
            .insert_user(NewUser {
                username: "tie".into(),
                email: "tie@example.com".into(),
                full_name: None,
            })
            .unwrap();
        let at = Utc::now();
        {
            let mut tables = store.tables.lock();
            for _ in 0..16 {
                let review = Review {
                    id: Uuid::new_v4(),
                    product_id: product.id,
                    user_id: user.id,
                    rating: 3,
                    comment: None,
                    created_at: at,
                    updated_at: at,
                };
                tables.reviews.insert(review.id, review);
            }
        }

        let ids: Vec<Uuid> = store
            .find_reviews_by_product(product.id)
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        let by_user: Vec<Uuid> = store
            .find_reviews_by_user(user.id)
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(by_user, sorted);
    }

    #[test]
    fn same_instant_orders_list_in_id_order() {
        let store = InMemoryStore::new();
        let user = store
            .insert_user(NewUser {
                username: "tie".into(),
                email: "tie@example.com".into(),
                full_name: None,
            })
            .unwrap();
        let at = Utc::now();
        {
            let mut tables = store.tables.lock();
            for _ in 0..16 {
                let order = Order {
                    id: Uuid::new_v4(),
                    user_id: user.id,
                    status: OrderStatus::Pending,
                    total_price: BigDecimal::from(0),
                    created_at: at,
                    updated_at: at,
                    items: vec![],
                };
                tables.orders.insert(order.id, order);
            }
        }

        let ids: Vec<Uuid> = store
            .find_orders_by_user(user.id)
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn product_with_unknown_category_is_rejected() {
        let store = InMemoryStore::new();
        let result = store.insert_product(NewProduct {
            name: "Lamp".into(),
            description: None,
            price: BigDecimal::from(10),
            stock_quantity: 1,
            category_id: Some(Uuid::new_v4()),
        });
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));

        let product = seed_product(&store, 1);
        let result = store.update_product_locked(product.id, &mut |p| {
            p.category_id = Some(Uuid::new_v4());
            Ok(())
        });
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(store.find_product(product.id).unwrap().unwrap().category_id.is_none());
    }

    #[test]
    fn deleting_a_category_detaches_children_and_products() {
        let store = InMemoryStore::new();
        let parent = store
            .insert_category(NewCategory {
                name: "Kitchen".into(),
                description: None,
                parent_id: None,
                active: true,
            })
            .unwrap();
        let child = store
            .insert_category(NewCategory {
                name: "Kettles".into(),
                description: None,
                parent_id: Some(parent.id),
                active: true,
            })
            .unwrap();
        let product = store
            .insert_product(NewProduct {
                name: "Kettle".into(),
                description: None,
                price: BigDecimal::from(20),
                stock_quantity: 1,
                category_id: Some(parent.id),
            })
            .unwrap();

        assert!(store.delete_category(parent.id).unwrap());
        assert!(!store.delete_category(parent.id).unwrap());
        assert!(store.find_category(child.id).unwrap().unwrap().is_root());
        assert!(store.find_product(product.id).unwrap().unwrap().category_id.is_none());
    }

    #[test]
    fn user_with_orders_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let user = store
            .insert_user(NewUser {
                username: "kept".into(),
                email: "kept@example.com".into(),
                full_name: None,
            })
            .unwrap();
        store
            .insert_order(NewOrder {
                user_id: user.id,
                status: OrderStatus::Pending,
                total_price: BigDecimal::from(0),
                items: vec![],
            })
            .unwrap();
        assert!(matches!(
            store.delete_user(user.id),
            Err(DomainError::Conflict(_))
        ));
        assert!(store.find_user(user.id).unwrap().is_some());
    }
}
