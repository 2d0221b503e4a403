pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::AppState;
pub use config::Config;
pub use db::{create_pool, DbPool};
pub use domain::ports::Store;
pub use infrastructure::{DieselStore, InMemoryStore};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::in_stock_products,
        handlers::products::top_rated_products,
        handlers::products::products_by_category,
        handlers::categories::create_category,
        handlers::categories::list_categories,
        handlers::categories::active_categories,
        handlers::categories::root_categories,
        handlers::categories::search_categories,
        handlers::categories::get_category_by_name,
        handlers::categories::category_name_exists,
        handlers::categories::get_category,
        handlers::categories::update_category,
        handlers::categories::delete_category,
        handlers::categories::subcategories,
        handlers::users::register_user,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::orders::place_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::orders_for_user,
        handlers::orders::update_order_status,
        handlers::orders::delete_order,
        handlers::reviews::create_review,
        handlers::reviews::list_reviews,
        handlers::reviews::get_review,
        handlers::reviews::update_review,
        handlers::reviews::delete_review,
        handlers::reviews::reviews_for_product,
        handlers::reviews::average_rating,
        handlers::reviews::reviews_for_user,
    ),
    tags(
        (name = "products", description = "Catalog products"),
        (name = "categories", description = "Product category tree"),
        (name = "users", description = "Buyers and review authors"),
        (name = "orders", description = "Order placement and lifecycle"),
        (name = "reviews", description = "Product reviews and ratings"),
    )
)]
pub struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(
    pool: &DbPool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migrations", applied.len());
    Ok(())
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server<S: Store>(
    state: AppState<S>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(state);
    let openapi = ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(handlers::configure::<S>)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
