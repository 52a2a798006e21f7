//! Embedded schema migrations.
//!
//! diesel_migrations drives a synchronous `PgConnection`, so every entry
//! point hops onto the blocking pool.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{AppError, AppResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Lists migrations that have not been applied yet.
pub async fn pending_migrations(database_url: &str) -> AppResult<Vec<String>> {
    with_connection(database_url, |conn| {
        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::database("check pending migrations", anyhow::anyhow!(e)))?;
        Ok(pending.iter().map(|m| m.name().to_string()).collect())
    })
    .await
}

/// Applies all pending migrations, returning the applied versions.
pub async fn run_migrations(database_url: &str) -> AppResult<Vec<String>> {
    with_connection(database_url, |conn| {
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::database("run pending migrations", anyhow::anyhow!(e)))?;
        Ok(applied.iter().map(|v| v.to_string()).collect())
    })
    .await
}

/// Reverts the last `steps` applied migrations, returning the reverted versions.
pub async fn revert_migrations(database_url: &str, steps: u32) -> AppResult<Vec<String>> {
    with_connection(database_url, move |conn| {
        let mut reverted = Vec::new();
        for _ in 0..steps {
            if conn
                .applied_migrations()
                .map_err(|e| AppError::database("list applied migrations", anyhow::anyhow!(e)))?
                .is_empty()
            {
                break;
            }
            let version = conn
                .revert_last_migration(MIGRATIONS)
                .map_err(|e| AppError::database("revert migration", anyhow::anyhow!(e)))?;
            reverted.push(version.to_string());
        }
        Ok(reverted)
    })
    .await
}

async fn with_connection<T, F>(database_url: &str, f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> AppResult<T> + Send + 'static,
{
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url)
            .map_err(|e| AppError::database("establish connection for migrations", e))?;
        f(&mut conn)
    })
    .await
    .map_err(|e| AppError::Internal {
        source: anyhow::Error::from(e),
    })?
}
