pub mod category_service;
pub mod order_service;
pub mod product_service;
pub mod rating_aggregator;
pub mod review_service;
pub mod stock_ledger;
pub mod user_service;

use crate::domain::ports::Store;

use category_service::CategoryService;
use order_service::OrderService;
use product_service::ProductService;
use review_service::ReviewService;
use user_service::UserService;

/// All services wired over one storage backend.
pub struct AppState<S> {
    pub products: ProductService<S>,
    pub orders: OrderService<S>,
    pub reviews: ReviewService<S>,
    pub users: UserService<S>,
    pub categories: CategoryService<S>,
}

impl<S: Store> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            products: ProductService::new(store.clone()),
            orders: OrderService::new(store.clone()),
            reviews: ReviewService::new(store.clone()),
            users: UserService::new(store.clone()),
            categories: CategoryService::new(store),
        }
    }
}
