//! Postgres connection pool
//!
//! Request handlers share one `PgPool`. Acquisition is bounded so a saturated
//! pool surfaces as a 500 instead of a hung request.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a request waits for a free connection
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

fn pool_options(max_connections: u32) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

/// Connect with [`DEFAULT_MAX_CONNECTIONS`].
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/platerate").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Connect with an explicit pool size. Zero is raised to one.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    let options = pool_options(max_connections);
    tracing::debug!(
        max_connections = options.get_max_connections(),
        "connecting to database"
    );
    options.connect(database_url).await
}
