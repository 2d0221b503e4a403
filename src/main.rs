use std::io;

use catalog_service::{build_server, create_pool, run_migrations, AppState, Config, DieselStore};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;

    let pool = create_pool(&config.database_url, config.db_pool_size).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    log::info!(
        "Starting server at http://{}:{} (pool size {})",
        config.host,
        config.port,
        config.db_pool_size
    );

    let state = AppState::new(DieselStore::new(pool));
    build_server(state, &config.host, config.port)?.await
}
