pub mod categories;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

use std::str::FromStr;

use actix_web::web;
use bigdecimal::BigDecimal;

use crate::domain::ports::Store;
use crate::errors::AppError;

/// Decimal amounts travel as strings, e.g. "9.99".
pub(crate) fn parse_decimal(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid {} '{}': {}", field, raw, e)))
}

/// Body, path, and query extraction failures answer 400 with the same
/// `{"error": ...}` body as every other failure.
fn reject_malformed(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }));
}

/// Registers every `/api` route for a given storage backend.
///
/// Literal segments such as `/in-stock` are registered before `/{id}` so
/// they are not taken for an id.
pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    reject_malformed(cfg);
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/products")
                    .route("", web::post().to(products::create_product::<S>))
                    .route("", web::get().to(products::list_products::<S>))
                    .route("/in-stock", web::get().to(products::in_stock_products::<S>))
                    .route("/top-rated", web::get().to(products::top_rated_products::<S>))
                    .route(
                        "/category/{category_id}",
                        web::get().to(products::products_by_category::<S>),
                    )
                    .route("/{id}", web::get().to(products::get_product::<S>))
                    .route("/{id}", web::put().to(products::update_product::<S>)),
            )
            .service(
                web::scope("/categories")
                    .route("", web::post().to(categories::create_category::<S>))
                    .route("", web::get().to(categories::list_categories::<S>))
                    .route("/active", web::get().to(categories::active_categories::<S>))
                    .route("/root", web::get().to(categories::root_categories::<S>))
                    .route("/search", web::get().to(categories::search_categories::<S>))
                    .route(
                        "/name/{name}",
                        web::get().to(categories::get_category_by_name::<S>),
                    )
                    .route(
                        "/check-name/{name}",
                        web::get().to(categories::category_name_exists::<S>),
                    )
                    .route("/{id}", web::get().to(categories::get_category::<S>))
                    .route("/{id}", web::put().to(categories::update_category::<S>))
                    .route("/{id}", web::delete().to(categories::delete_category::<S>))
                    .route(
                        "/{id}/subcategories",
                        web::get().to(categories::subcategories::<S>),
                    ),
            )
            .service(
                web::scope("/users")
                    .route("", web::get().to(users::list_users::<S>))
                    .route("/register", web::post().to(users::register_user::<S>))
                    .route("/{id}", web::get().to(users::get_user::<S>))
                    .route("/{id}", web::put().to(users::update_user::<S>))
                    .route("/{id}", web::delete().to(users::delete_user::<S>))
                    .route("/{id}/orders", web::get().to(orders::orders_for_user::<S>)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(orders::place_order::<S>))
                    .route("", web::get().to(orders::list_orders::<S>))
                    .route("/{id}", web::get().to(orders::get_order::<S>))
                    .route("/{id}", web::delete().to(orders::delete_order::<S>))
                    .route("/{id}/status", web::put().to(orders::update_order_status::<S>)),
            )
            .service(
                web::scope("/reviews")
                    .route("", web::post().to(reviews::create_review::<S>))
                    .route("", web::get().to(reviews::list_reviews::<S>))
                    .route("/{id}", web::get().to(reviews::get_review::<S>))
                    .route("/{id}", web::put().to(reviews::update_review::<S>))
                    .route("/{id}", web::delete().to(reviews::delete_review::<S>))
                    .route(
                        "/product/{product_id}",
                        web::get().to(reviews::reviews_for_product::<S>),
                    )
                    .route(
                        "/product/{product_id}/average",
                        web::get().to(reviews::average_rating::<S>),
                    )
                    .route(
                        "/user/{user_id}",
                        web::get().to(reviews::reviews_for_user::<S>),
                    ),
            ),
    );
}
