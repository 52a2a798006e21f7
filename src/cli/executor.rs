//! Command executor for dispatching CLI commands

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::AppResult;

/// Runs the parsed command against the merged settings.
///
/// With no subcommand this serves, exactly like `serve` without flags.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    match cli.command_or_default() {
        Commands::Serve {
            in_memory, dry_run, ..
        } => {
            ServeCommandHandler::new(settings, in_memory)
                .execute(dry_run)
                .await
        }
        Commands::Migrate { dry_run, rollback } => {
            if let Some(steps) = rollback
                && steps > 10
            {
                tracing::warn!(steps, "Rolling back a large number of migrations");
            }
            MigrateCommandHandler::new(settings)
                .execute(dry_run, rollback)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn test_execute_serve_dry_run() {
        let cli = Cli::try_parse_from(["roster", "serve", "--dry-run", "--in-memory"]).unwrap();
        assert!(execute_command(&cli, Settings::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_execute_migrate_with_bad_url_fails_fast() {
        let cli = Cli::try_parse_from(["roster", "migrate"]).unwrap();
        let mut settings = Settings::default();
        settings.database.url = String::new();
        assert!(execute_command(&cli, settings).await.is_err());
    }
}
