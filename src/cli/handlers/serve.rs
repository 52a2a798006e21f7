//! Serve command handler
//!
//! Either validates the configuration and exits (`--dry-run`) or runs the server.

use crate::config::Settings;
use crate::error::AppResult;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
    in_memory: bool,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, in_memory: bool) -> Self {
        Self { config, in_memory }
    }

    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }

        Server::new(self.config)
            .force_in_memory(self.in_memory)
            .run()
            .await
    }

    /// Validates configuration and reports what a real run would do.
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!("✓ Storage: {}", self.storage_summary());
        println!("✓ Logger level: {}", self.config.logger.level);
        println!("Dry run completed successfully");
        Ok(())
    }

    fn storage_summary(&self) -> &'static str {
        if self.in_memory {
            "in-memory (forced by --in-memory)"
        } else if self.config.database.enabled {
            "postgres, with in-memory fallback"
        } else {
            "in-memory (database disabled)"
        }
    }
}
