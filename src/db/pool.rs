//! Async database connection pool implementation.
//!
//! Uses bb8 connection pool manager with diesel_async for PostgreSQL connections.

use std::time::Duration;

use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Async connection pool type alias.
///
/// bb8::Pool internally uses Arc, so Clone is cheap (just reference count increment).
pub type AsyncDbPool = Pool<AsyncPgConnection>;

/// Creates an async database connection pool and proves it can serve a query.
///
/// bb8 builds lazily, so a pool can be returned for an unreachable server;
/// the trailing `SELECT 1` turns that into an error here rather than on the
/// first request.
///
/// # Errors
///
/// - `AppError::Database` if the pool cannot be built or the probe query fails
pub async fn establish_async_connection_pool(config: &DatabaseConfig) -> AppResult<AsyncDbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.as_str());
    let pool = Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connection_timeout))
        .build(manager)
        .await
        .map_err(|e| AppError::database("build connection pool", e))?;

    ping(&pool).await?;
    Ok(pool)
}

/// Runs a trivial query on a pooled connection.
pub async fn ping(pool: &AsyncDbPool) -> AppResult<()> {
    let mut conn = pool.get().await?;
    diesel::sql_query("SELECT 1")
        .execute(&mut conn)
        .await
        .map_err(|e| AppError::database("ping", e))?;
    Ok(())
}
