use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;

/// Creates the PostgreSQL connection pool.
/// Connections are opened on first use, so the service starts even while
/// the database is unreachable; failures surface per request.
pub fn create_pool(config: &Config) -> PgPool {
    info!(
        "Configuring PostgreSQL pool for {}:{}/{}",
        config.db_host, config.db_port, config.db_name
    );

    PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy_with(config.connect_options())
}
