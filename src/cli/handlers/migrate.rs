//! Migrate command handler
//!
//! Applies, lists or reverts the embedded migrations against `database.url`.
//! Runs regardless of `database.enabled`; the connection settings must still
//! be valid.

use crate::config::Settings;
use crate::db;
use crate::error::AppResult;

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        self.config.database.validate_connection()?;

        if dry_run {
            return self.show_pending_migrations().await;
        }

        match rollback {
            Some(steps) => self.rollback_migrations(steps).await,
            None => self.run_migrations().await,
        }
    }

    async fn show_pending_migrations(&self) -> AppResult<()> {
        println!("Checking for pending migrations...");

        let pending = db::pending_migrations(&self.config.database.url).await?;
        if pending.is_empty() {
            println!("✓ No pending migrations found - database is up to date");
        } else {
            println!("Found {} pending migration(s):", pending.len());
            for name in &pending {
                println!("  - {}", name);
            }
            println!("\nRun without --dry-run to apply these migrations");
        }

        Ok(())
    }

    async fn run_migrations(&self) -> AppResult<()> {
        println!("Running database migrations...");

        let applied = db::run_migrations(&self.config.database.url).await?;
        if applied.is_empty() {
            println!("✓ No migrations to apply - database is already up to date");
        } else {
            println!("✓ Applied {} migration(s):", applied.len());
            for version in &applied {
                println!("  - {}", version);
            }
        }
        tracing::info!(count = applied.len(), "Migrations applied");

        Ok(())
    }

    async fn rollback_migrations(&self, steps: u32) -> AppResult<()> {
        println!("Rolling back {} migration(s)...", steps);

        let reverted = db::revert_migrations(&self.config.database.url, steps).await?;
        if reverted.len() < steps as usize {
            println!(
                "Only {} migration(s) were applied; reverted all of them",
                reverted.len()
            );
        }
        for version in &reverted {
            println!("  - reverted {}", version);
        }
        tracing::info!(count = reverted.len(), "Migrations reverted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_rejects_invalid_database_url_before_connecting() {
        let mut config = Settings::default();
        config.database.url = "mysql://localhost/roster".to_string();

        let result = MigrateCommandHandler::new(config).execute(true, None).await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }
}
