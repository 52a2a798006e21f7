//! Startup-time choice between the real store and the substitute list.

use std::sync::Arc;

use super::{DynUserRepository, InMemoryUserRepository, PgUserRepository};
use crate::config::DatabaseConfig;
use crate::db;
use crate::error::AppResult;

/// Resolves the repository every request will use for the process lifetime.
///
/// The real store is used only when it is enabled, `force_memory` is off,
/// and the connection attempt (optional migrations, pool build and probe)
/// succeeds. Any failure is logged as a warning and the seeded substitute
/// list takes over. The choice is never revisited.
pub async fn select_user_repository(
    config: &DatabaseConfig,
    force_memory: bool,
) -> DynUserRepository {
    if force_memory {
        tracing::info!("In-memory storage forced, skipping database connection");
        return Arc::new(InMemoryUserRepository::seeded());
    }

    if !config.enabled {
        tracing::info!("Database disabled, using in-memory storage");
        return Arc::new(InMemoryUserRepository::seeded());
    }

    match connect(config).await {
        Ok(repo) => {
            tracing::info!("Connected to database");
            Arc::new(repo)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Database connection failed, falling back to in-memory storage"
            );
            Arc::new(InMemoryUserRepository::seeded())
        }
    }
}

async fn connect(config: &DatabaseConfig) -> AppResult<PgUserRepository> {
    if config.auto_migrate {
        let applied = db::run_migrations(&config.url).await?;
        if !applied.is_empty() {
            tracing::info!(count = applied.len(), "Applied pending migrations");
        }
    }

    let pool = db::establish_async_connection_pool(config).await?;
    Ok(PgUserRepository::new(pool))
}
