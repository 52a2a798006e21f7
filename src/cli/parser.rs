//! CLI argument parsing with clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI structure for roster
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(about = "A user management REST API")]
#[command(long_about = "
roster serves a small user-management REST API. It stores users in
PostgreSQL when a database is configured and reachable, and otherwise
falls back to an in-memory list seeded with two example users.

EXAMPLES:
    # Start the server with default configuration
    roster serve

    # Start server on custom host and port
    roster serve --host 0.0.0.0 --port 8080

    # Ignore the database and serve from memory
    roster serve --in-memory

    # Use custom configuration file
    roster --config /path/to/roster.toml serve

    # Check configuration without starting server
    roster serve --dry-run

    # Run database migrations
    roster migrate

    # Preview pending migrations
    roster migrate --dry-run

    # Rollback last 2 migrations
    roster migrate --rollback 2
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute (defaults to serve)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a configuration file (disables layered loading)
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Environment used to pick the configuration overlay
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Serve from the in-memory list even if a database is configured
        #[arg(long)]
        in_memory: bool,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply, list or revert database migrations
    Migrate {
        /// List pending migrations without applying them
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Revert the given number of applied migrations
        #[arg(long, value_name = "STEPS", conflicts_with = "dry_run", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve {
            host: None,
            port: None,
            log_level: None,
            in_memory: false,
            dry_run: false,
        }
    }
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Cli {
    /// The command to run, `serve` when none was given.
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or_default()
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["roster", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::try_parse_from(["roster"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.command_or_default(), Commands::default());
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::try_parse_from([
            "roster",
            "serve",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--in-memory",
            "--log-level",
            "debug",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Serve {
                host,
                port,
                log_level,
                in_memory,
                dry_run,
            }) => {
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(8080));
                assert_eq!(log_level, Some(LogLevel::Debug));
                assert!(in_memory);
                assert!(!dry_run);
            }
            other => panic!("Expected Serve command, got {:?}", other),
        }
    }

    #[test]
    fn test_migrate_command() {
        let cli = Cli::try_parse_from(["roster", "migrate", "--rollback", "2"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Migrate {
                dry_run: false,
                rollback: Some(2)
            })
        );
    }

    #[test]
    fn test_migrate_flags_conflict() {
        let err =
            Cli::try_parse_from(["roster", "migrate", "--dry-run", "--rollback", "1"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["roster", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_env_aliases() {
        let cli = Cli::try_parse_from(["roster", "--env", "prod"]).unwrap();
        assert_eq!(cli.env, Some(Environment::Production));
        assert_eq!(
            crate::config::Environment::from(Environment::Staging),
            crate::config::Environment::Staging
        );
    }
}
